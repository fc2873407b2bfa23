//! HTTP Catalog Source - 通过 HTTP 获取远端语音目录
//!
//! 目录是一个 JSON 文档（voices.json），一次 GET 取回全文

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::application::ports::{CatalogError, CatalogSourcePort};

/// 默认目录地址 (Hugging Face piper-voices)
pub const DEFAULT_CATALOG_URL: &str =
    "https://huggingface.co/rhasspy/piper-voices/raw/main/voices.json";

/// HTTP 目录来源配置
#[derive(Debug, Clone)]
pub struct HttpCatalogSourceConfig {
    /// 目录文档 URL
    pub url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpCatalogSourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// HTTP 目录来源
pub struct HttpCatalogSource {
    client: Client,
    config: HttpCatalogSourceConfig,
}

impl HttpCatalogSource {
    pub fn new(config: HttpCatalogSourceConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn with_default_config() -> Result<Self, CatalogError> {
        Self::new(HttpCatalogSourceConfig::default())
    }
}

#[async_trait]
impl CatalogSourcePort for HttpCatalogSource {
    async fn fetch_document(&self) -> Result<String, CatalogError> {
        tracing::debug!(url = %self.config.url, "Fetching voice catalog");

        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CatalogError::Unavailable("request timeout".to_string())
                } else {
                    CatalogError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Unavailable(format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| CatalogError::Unavailable(format!("failed to read body: {}", e)))
    }
}
