//! HTTP Voice Fetcher - 从远端文件存储流式下载语音文件
//!
//! 请求携带浏览器式 User-Agent（存储端会拒绝裸客户端），响应体分块
//! 写入目标文件，按 10% 粒度上报进度

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::application::ports::{DownloadError, ProgressTicker, VoiceFetcherPort};

/// 默认文件存储基址 (Hugging Face piper-voices)
pub const DEFAULT_STORE_BASE_URL: &str =
    "https://huggingface.co/rhasspy/piper-voices/resolve/main";

/// HTTP 文件下载配置
#[derive(Debug, Clone)]
pub struct HttpVoiceFetcherConfig {
    /// 文件存储基址；文件地址 = base_url + "/" + 目录相对路径
    pub base_url: String,
    /// 请求头 User-Agent
    pub user_agent: String,
    /// 单个文件的下载超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpVoiceFetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STORE_BASE_URL.to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            timeout_secs: 600,
        }
    }
}

/// HTTP 文件下载器
pub struct HttpVoiceFetcher {
    client: Client,
    config: HttpVoiceFetcherConfig,
}

impl HttpVoiceFetcher {
    pub fn new(config: HttpVoiceFetcherConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DownloadError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn with_default_config() -> Result<Self, DownloadError> {
        Self::new(HttpVoiceFetcherConfig::default())
    }

    fn file_url(&self, relative_path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            relative_path
        )
    }
}

#[async_trait]
impl VoiceFetcherPort for HttpVoiceFetcher {
    async fn fetch_file(
        &self,
        relative_path: &str,
        dest: &Path,
        expected_bytes: u64,
    ) -> Result<u64, DownloadError> {
        let url = self.file_url(relative_path);
        tracing::debug!(url = %url, dest = %dest.display(), "Downloading voice file");

        let transport = |reason: String| DownloadError::Transport {
            path: relative_path.to_string(),
            reason,
        };
        let io = |reason: String| DownloadError::Io {
            path: relative_path.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(transport(format!("HTTP {}", status)));
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| io(e.to_string()))?;
        let mut ticker = ProgressTicker::new(expected_bytes);
        let mut written = 0u64;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| transport(e.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| io(e.to_string()))?;
            written += chunk.len() as u64;
            if let Some(percent) = ticker.advance(chunk.len() as u64) {
                tracing::info!(file = %relative_path, percent, "Download progress");
            }
        }

        file.flush().await.map_err(|e| io(e.to_string()))?;
        tracing::debug!(file = %relative_path, bytes = written, "Download complete");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpVoiceFetcherConfig::default();
        assert_eq!(config.base_url, DEFAULT_STORE_BASE_URL);
        assert_eq!(config.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn test_file_url_join() {
        let fetcher = HttpVoiceFetcher::new(HttpVoiceFetcherConfig {
            base_url: "http://store.local/base/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            fetcher.file_url("en/en_US/amy/medium/en_US-amy-medium.onnx"),
            "http://store.local/base/en/en_US/amy/medium/en_US-amy-medium.onnx"
        );
    }
}
