//! Voice Catalog Client - 语音目录客户端
//!
//! 显式实例持有自己的缓存与 TTL 策略，由调用方传引用使用，
//! 不依赖进程级单例。过期或显式 refresh 时重新获取并整体替换。

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::application::ports::{CatalogError, CatalogSourcePort};
use crate::domain::voice::{QualityTier, VoiceCatalog, VoiceDescriptor};

/// 目录客户端配置
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// 缓存刷新间隔（秒）；0 表示首次获取后进程内不过期
    pub refresh_secs: u64,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self { refresh_secs: 3600 }
    }
}

struct CachedCatalog {
    catalog: Arc<VoiceCatalog>,
    fetched_at: Instant,
}

/// 语音目录客户端
pub struct VoiceCatalogClient {
    source: Arc<dyn CatalogSourcePort>,
    config: CatalogClientConfig,
    cache: RwLock<Option<CachedCatalog>>,
}

impl VoiceCatalogClient {
    pub fn new(source: Arc<dyn CatalogSourcePort>, config: CatalogClientConfig) -> Self {
        Self {
            source,
            config,
            cache: RwLock::new(None),
        }
    }

    /// 获取目录；命中未过期缓存时不访问网络
    pub async fn catalog(&self) -> Result<Arc<VoiceCatalog>, CatalogError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if !self.expired(cached) {
                return Ok(cached.catalog.clone());
            }
        }
        self.refresh().await
    }

    /// 强制重新获取并整体替换缓存
    pub async fn refresh(&self) -> Result<Arc<VoiceCatalog>, CatalogError> {
        let document = self.source.fetch_document().await?;
        let catalog = Arc::new(VoiceCatalog::parse(&document)?);
        tracing::debug!(voices = catalog.len(), "Voice catalog fetched");

        *self.cache.write().await = Some(CachedCatalog {
            catalog: catalog.clone(),
            fetched_at: Instant::now(),
        });
        Ok(catalog)
    }

    fn expired(&self, cached: &CachedCatalog) -> bool {
        self.config.refresh_secs != 0
            && cached.fetched_at.elapsed() >= Duration::from_secs(self.config.refresh_secs)
    }

    /// 按 key（或别名）取描述符
    pub async fn descriptor(&self, voice_key: &str) -> Result<VoiceDescriptor, CatalogError> {
        self.catalog()
            .await?
            .get(voice_key)
            .cloned()
            .ok_or_else(|| CatalogError::VoiceNotFound(voice_key.to_string()))
    }

    /// 目录序最佳匹配 → voice key
    pub async fn find_best_voice(
        &self,
        language_code: &str,
        quality: QualityTier,
    ) -> Result<Option<String>, CatalogError> {
        Ok(self
            .catalog()
            .await?
            .find_best_voice(language_code, quality)
            .map(|v| v.key.clone()))
    }

    /// 按语言前缀与音质过滤（纯查询）
    pub async fn list_voices(
        &self,
        language: Option<&str>,
        quality: Option<QualityTier>,
    ) -> Result<Vec<VoiceDescriptor>, CatalogError> {
        Ok(self
            .catalog()
            .await?
            .filter(language, quality)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::FakeCatalogSource;

    const DOCUMENT: &str = r#"{
        "en_US-amy-medium": {
            "language": { "code": "en_US" },
            "quality": "medium",
            "num_speakers": 1,
            "files": {
                "en/en_US/amy/medium/en_US-amy-medium.onnx": { "size_bytes": 1000 }
            }
        }
    }"#;

    #[tokio::test]
    async fn test_catalog_is_fetched_once() {
        let source = Arc::new(FakeCatalogSource::with_document(DOCUMENT));
        let client = VoiceCatalogClient::new(source.clone(), CatalogClientConfig::default());

        client.catalog().await.unwrap();
        client.catalog().await.unwrap();
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_refresh_forces_refetch() {
        let source = Arc::new(FakeCatalogSource::with_document(DOCUMENT));
        let client = VoiceCatalogClient::new(source.clone(), CatalogClientConfig::default());

        client.catalog().await.unwrap();
        client.refresh().await.unwrap();
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_caches_forever() {
        let source = Arc::new(FakeCatalogSource::with_document(DOCUMENT));
        let client = VoiceCatalogClient::new(source.clone(), CatalogClientConfig { refresh_secs: 0 });

        client.catalog().await.unwrap();
        client.catalog().await.unwrap();
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_source() {
        let source = Arc::new(FakeCatalogSource::failing("connection refused"));
        let client = VoiceCatalogClient::new(source, CatalogClientConfig::default());

        let err = client.catalog().await.unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_descriptor_not_found() {
        let source = Arc::new(FakeCatalogSource::with_document(DOCUMENT));
        let client = VoiceCatalogClient::new(source, CatalogClientConfig::default());

        let err = client.descriptor("fr_FR-missing-high").await.unwrap_err();
        assert!(matches!(err, CatalogError::VoiceNotFound(key) if key == "fr_FR-missing-high"));
    }

    #[tokio::test]
    async fn test_find_best_voice_returns_key() {
        let source = Arc::new(FakeCatalogSource::with_document(DOCUMENT));
        let client = VoiceCatalogClient::new(source, CatalogClientConfig::default());

        let key = client
            .find_best_voice("en", QualityTier::Medium)
            .await
            .unwrap();
        assert_eq!(key.as_deref(), Some("en_US-amy-medium"));
        assert!(client
            .find_best_voice("xx", QualityTier::Medium)
            .await
            .unwrap()
            .is_none());
    }
}
