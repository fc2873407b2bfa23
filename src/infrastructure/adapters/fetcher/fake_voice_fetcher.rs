//! Fake Voice Fetcher - 用于测试的文件下载器
//!
//! 按相对路径返回预置的字节内容或预置错误，并统计请求次数

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::ports::{DownloadError, VoiceFetcherPort};

/// Fake Voice Fetcher
#[derive(Default)]
pub struct FakeVoiceFetcher {
    payloads: Mutex<HashMap<String, Result<Vec<u8>, String>>>,
    fetch_count: AtomicUsize,
}

impl FakeVoiceFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置某个相对路径的下载内容
    pub fn set_payload(&self, relative_path: &str, bytes: &[u8]) {
        self.payloads
            .lock()
            .unwrap()
            .insert(relative_path.to_string(), Ok(bytes.to_vec()));
    }

    /// 预置某个相对路径的下载失败
    pub fn set_error(&self, relative_path: &str, reason: &str) {
        self.payloads
            .lock()
            .unwrap()
            .insert(relative_path.to_string(), Err(reason.to_string()));
    }

    /// 已发生的下载请求次数
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VoiceFetcherPort for FakeVoiceFetcher {
    async fn fetch_file(
        &self,
        relative_path: &str,
        dest: &Path,
        _expected_bytes: u64,
    ) -> Result<u64, DownloadError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        let scripted = {
            let payloads = self.payloads.lock().unwrap();
            payloads.get(relative_path).cloned()
        };

        match scripted {
            Some(Ok(bytes)) => {
                tokio::fs::write(dest, &bytes)
                    .await
                    .map_err(|e| DownloadError::Io {
                        path: relative_path.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(bytes.len() as u64)
            }
            Some(Err(reason)) => Err(DownloadError::Transport {
                path: relative_path.to_string(),
                reason,
            }),
            None => Err(DownloadError::Transport {
                path: relative_path.to_string(),
                reason: "no payload scripted".to_string(),
            }),
        }
    }
}
