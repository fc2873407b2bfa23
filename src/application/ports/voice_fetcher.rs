//! Voice Fetcher Port - 语音文件下载抽象

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// 下载错误
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Download failed for '{path}': {reason}")]
    Transport { path: String, reason: String },

    #[error("IO error writing '{path}': {reason}")]
    Io { path: String, reason: String },
}

/// Voice Fetcher Port
///
/// 远端语音文件存储的抽象；一次调用下载一个文件
#[async_trait]
pub trait VoiceFetcherPort: Send + Sync {
    /// 将 `relative_path` 对应的远端文件分块下载到 `dest`
    ///
    /// `expected_bytes` 仅用于进度上报，为 0 时不上报进度。
    /// 返回实际写入的字节数。
    async fn fetch_file(
        &self,
        relative_path: &str,
        dest: &Path,
        expected_bytes: u64,
    ) -> Result<u64, DownloadError>;
}

/// 下载进度打点器
///
/// 以 10% 为粒度产生进度步进，避免逐块刷日志
#[derive(Debug)]
pub struct ProgressTicker {
    total: u64,
    received: u64,
    reported_decile: u8,
}

impl ProgressTicker {
    pub fn new(total_bytes: u64) -> Self {
        Self {
            total: total_bytes,
            received: 0,
            reported_decile: 0,
        }
    }

    /// 记录新收到的字节数；跨过新的 10% 档位时返回到达的百分比
    pub fn advance(&mut self, bytes: u64) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        self.received = (self.received + bytes).min(self.total);
        let decile = (self.received * 10 / self.total) as u8;
        if decile > self.reported_decile {
            self.reported_decile = decile;
            Some(decile * 10)
        } else {
            None
        }
    }
}
