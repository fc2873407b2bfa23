//! Voice Asset Manager - 语音资产管理
//!
//! 保证语音模型的全部文件在本地就位并通过校验。缺失或损坏的文件按
//! 描述符顺序重新下载；单个文件失败即中止剩余下载，已校验文件原样
//! 保留，下次调用从检查现有文件开始（幂等续传，不回滚）。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncReadExt;

use crate::application::catalog::VoiceCatalogClient;
use crate::application::ports::{CatalogError, DownloadError, VoiceFetcherPort};
use crate::domain::voice::{LocalVoiceModel, VoiceFile};

/// MD5 计算的分块读取大小
const HASH_READ_BUF: usize = 8192;

/// 资产管理错误
#[derive(Debug, Error)]
pub enum AssetError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    /// 下载后的文件校验和不匹配
    #[error("Integrity check failed for '{file}': expected {expected}, got {actual}")]
    Integrity {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("Voice '{0}' has no .onnx model file in catalog")]
    NoModelFile(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// 语音资产管理器
pub struct VoiceAssetManager {
    catalog: Arc<VoiceCatalogClient>,
    fetcher: Arc<dyn VoiceFetcherPort>,
    /// 同一管理器上的并发 ensure 串行化；跨进程竞争由调用方负责
    ensure_lock: tokio::sync::Mutex<()>,
}

impl VoiceAssetManager {
    pub fn new(catalog: Arc<VoiceCatalogClient>, fetcher: Arc<dyn VoiceFetcherPort>) -> Self {
        Self {
            catalog,
            fetcher,
            ensure_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// 确保 `voice_key` 的全部文件在 `output_dir` 就位且通过校验
    ///
    /// 全部文件已存在且校验通过时不产生任何下载。注意：两个进程同时
    /// ensure 同一语音仍会竞争写同一批文件，由调用方避免。
    pub async fn ensure_local(
        &self,
        voice_key: &str,
        output_dir: &Path,
    ) -> Result<LocalVoiceModel, AssetError> {
        let _guard = self.ensure_lock.lock().await;

        let descriptor = self.catalog.descriptor(voice_key).await?;
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| AssetError::Io(e.to_string()))?;

        for (remote_path, file) in &descriptor.files {
            let file_name = file_basename(remote_path);
            let dest = output_dir.join(file_name);

            if self.is_valid(&dest, file).await? {
                tracing::debug!(file = %file_name, "Voice file already present");
                continue;
            }

            tracing::info!(
                file = %file_name,
                size_bytes = file.size_bytes,
                "Downloading voice file"
            );
            self.fetcher
                .fetch_file(remote_path, &dest, file.size_bytes)
                .await?;

            match &file.md5_digest {
                Some(expected) => {
                    let actual = md5_of_file(&dest).await?;
                    if !actual.eq_ignore_ascii_case(expected) {
                        return Err(AssetError::Integrity {
                            file: file_name.to_string(),
                            expected: expected.clone(),
                            actual,
                        });
                    }
                    tracing::info!(file = %file_name, "Voice file verified");
                }
                None => {
                    tracing::info!(file = %file_name, "Voice file downloaded (no checksum available)");
                }
            }
        }

        let (model_remote, _) = descriptor
            .model_file()
            .ok_or_else(|| AssetError::NoModelFile(voice_key.to_string()))?;
        let model_path = output_dir.join(file_basename(model_remote));
        let config_path = match descriptor.config_file() {
            Some((config_remote, _)) => output_dir.join(file_basename(config_remote)),
            None => peer_config_path(&model_path),
        };

        Ok(LocalVoiceModel::new(
            descriptor.key.clone(),
            model_path,
            config_path,
        ))
    }

    /// 文件存在且（有校验和时）MD5 匹配
    async fn is_valid(&self, path: &Path, file: &VoiceFile) -> Result<bool, AssetError> {
        if !path.exists() {
            return Ok(false);
        }
        match &file.md5_digest {
            Some(expected) => {
                let actual = md5_of_file(path).await?;
                if actual.eq_ignore_ascii_case(expected) {
                    Ok(true)
                } else {
                    tracing::warn!(
                        file = %path.display(),
                        "Local voice file failed checksum, re-downloading"
                    );
                    Ok(false)
                }
            }
            None => Ok(true),
        }
    }
}

/// 分块计算文件 MD5
async fn md5_of_file(path: &Path) -> Result<String, AssetError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| AssetError::Io(e.to_string()))?;
    let mut context = md5::Context::new();
    let mut buf = vec![0u8; HASH_READ_BUF];

    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| AssetError::Io(e.to_string()))?;
        if n == 0 {
            break;
        }
        context.consume(&buf[..n]);
    }

    Ok(format!("{:x}", context.compute()))
}

/// 目录路径的末段作为本地文件名
fn file_basename(remote_path: &str) -> &str {
    remote_path.rsplit('/').next().unwrap_or(remote_path)
}

/// 模型路径的配套 .onnx.json 路径
fn peer_config_path(model_path: &Path) -> PathBuf {
    let mut os = model_path.to_path_buf().into_os_string();
    os.push(".json");
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::catalog::CatalogClientConfig;
    use crate::infrastructure::adapters::{FakeCatalogSource, FakeVoiceFetcher};
    use tempfile::tempdir;

    const MODEL_REMOTE: &str = "en/en_US/test/medium/en_US-test-medium.onnx";
    const CONFIG_REMOTE: &str = "en/en_US/test/medium/en_US-test-medium.onnx.json";
    const CARD_REMOTE: &str = "en/en_US/test/medium/MODEL_CARD";

    const MODEL_BYTES: &[u8] = b"fake onnx model bytes";
    const CONFIG_BYTES: &[u8] = b"{\"audio\":{\"sample_rate\":22050}}";
    const CARD_BYTES: &[u8] = b"model card";

    fn fixture_document() -> String {
        format!(
            r#"{{
                "en_US-test-medium": {{
                    "language": {{ "code": "en_US" }},
                    "quality": "medium",
                    "num_speakers": 1,
                    "files": {{
                        "{model}": {{ "size_bytes": {model_len}, "md5_digest": "{model_md5}" }},
                        "{config}": {{ "size_bytes": {config_len}, "md5_digest": "{config_md5}" }},
                        "{card}": {{ "size_bytes": {card_len} }}
                    }}
                }}
            }}"#,
            model = MODEL_REMOTE,
            model_len = MODEL_BYTES.len(),
            model_md5 = format!("{:x}", md5::compute(MODEL_BYTES)),
            config = CONFIG_REMOTE,
            config_len = CONFIG_BYTES.len(),
            config_md5 = format!("{:x}", md5::compute(CONFIG_BYTES)),
            card = CARD_REMOTE,
            card_len = CARD_BYTES.len(),
        )
    }

    fn fixture_manager() -> (VoiceAssetManager, Arc<FakeCatalogSource>, Arc<FakeVoiceFetcher>) {
        let source = Arc::new(FakeCatalogSource::with_document(fixture_document()));
        let catalog = Arc::new(VoiceCatalogClient::new(
            source.clone(),
            CatalogClientConfig::default(),
        ));
        let fetcher = Arc::new(FakeVoiceFetcher::new());
        fetcher.set_payload(MODEL_REMOTE, MODEL_BYTES);
        fetcher.set_payload(CONFIG_REMOTE, CONFIG_BYTES);
        fetcher.set_payload(CARD_REMOTE, CARD_BYTES);

        let manager = VoiceAssetManager::new(catalog, fetcher.clone());
        (manager, source, fetcher)
    }

    #[tokio::test]
    async fn test_downloads_and_verifies_all_files() {
        let dir = tempdir().unwrap();
        let (manager, _, fetcher) = fixture_manager();

        let model = manager
            .ensure_local("en_US-test-medium", dir.path())
            .await
            .unwrap();

        assert_eq!(fetcher.fetch_count(), 3);
        assert_eq!(model.voice_key(), "en_US-test-medium");
        assert_eq!(
            std::fs::read(model.model_path()).unwrap(),
            MODEL_BYTES.to_vec()
        );
        assert_eq!(
            std::fs::read(model.config_path()).unwrap(),
            CONFIG_BYTES.to_vec()
        );
    }

    #[tokio::test]
    async fn test_second_call_performs_zero_network_requests() {
        let dir = tempdir().unwrap();
        let (manager, source, fetcher) = fixture_manager();

        let first = manager
            .ensure_local("en_US-test-medium", dir.path())
            .await
            .unwrap();
        let catalog_fetches = source.fetch_count();
        let file_fetches = fetcher.fetch_count();

        let second = manager
            .ensure_local("en_US-test-medium", dir.path())
            .await
            .unwrap();

        // 幂等: 第二次既不取目录也不下文件，且解析到同一批文件
        assert_eq!(source.fetch_count(), catalog_fetches);
        assert_eq!(fetcher.fetch_count(), file_fetches);
        assert_eq!(first, second);
        assert_eq!(
            std::fs::read(second.model_path()).unwrap(),
            MODEL_BYTES.to_vec()
        );
    }

    #[tokio::test]
    async fn test_corrupted_local_file_is_redownloaded() {
        let dir = tempdir().unwrap();
        let (manager, _, fetcher) = fixture_manager();

        manager
            .ensure_local("en_US-test-medium", dir.path())
            .await
            .unwrap();
        let model_path = dir.path().join("en_US-test-medium.onnx");
        std::fs::write(&model_path, b"corrupted").unwrap();

        let before = fetcher.fetch_count();
        manager
            .ensure_local("en_US-test-medium", dir.path())
            .await
            .unwrap();

        assert_eq!(fetcher.fetch_count(), before + 1);
        assert_eq!(std::fs::read(&model_path).unwrap(), MODEL_BYTES.to_vec());
    }

    #[tokio::test]
    async fn test_integrity_error_names_offending_file() {
        let dir = tempdir().unwrap();
        let (manager, _, fetcher) = fixture_manager();
        fetcher.set_payload(MODEL_REMOTE, b"tampered payload");

        let err = manager
            .ensure_local("en_US-test-medium", dir.path())
            .await
            .unwrap_err();

        match err {
            AssetError::Integrity { file, .. } => assert_eq!(file, "en_US-test-medium.onnx"),
            other => panic!("expected integrity error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_verified_files_and_resumes() {
        let dir = tempdir().unwrap();
        let (manager, _, fetcher) = fixture_manager();
        fetcher.set_error(CONFIG_REMOTE, "503 service unavailable");

        let err = manager
            .ensure_local("en_US-test-medium", dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, AssetError::Download(_)));

        // 路径序在 config 之前的文件已就位并保留
        assert!(dir.path().join("MODEL_CARD").exists());
        assert!(dir.path().join("en_US-test-medium.onnx").exists());
        assert!(!dir.path().join("en_US-test-medium.onnx.json").exists());
        let after_failure = fetcher.fetch_count();

        // 修复后重试只补缺失的文件
        fetcher.set_payload(CONFIG_REMOTE, CONFIG_BYTES);
        manager
            .ensure_local("en_US-test-medium", dir.path())
            .await
            .unwrap();
        assert_eq!(fetcher.fetch_count(), after_failure + 1);
    }

    #[tokio::test]
    async fn test_unknown_voice_key() {
        let dir = tempdir().unwrap();
        let (manager, _, _) = fixture_manager();

        let err = manager.ensure_local("xx_XX-nope-high", dir.path()).await;
        assert!(matches!(
            err,
            Err(AssetError::Catalog(CatalogError::VoiceNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_file_without_checksum_accepted_unverified() {
        let dir = tempdir().unwrap();
        let (manager, _, fetcher) = fixture_manager();
        // MODEL_CARD 无校验和，任何内容都接受
        fetcher.set_payload(CARD_REMOTE, b"different card text");

        manager
            .ensure_local("en_US-test-medium", dir.path())
            .await
            .unwrap();
        assert_eq!(
            std::fs::read(dir.path().join("MODEL_CARD")).unwrap(),
            b"different card text".to_vec()
        );
    }

    #[test]
    fn test_file_basename() {
        assert_eq!(file_basename("a/b/c/voice.onnx"), "voice.onnx");
        assert_eq!(file_basename("flat.json"), "flat.json");
    }
}
