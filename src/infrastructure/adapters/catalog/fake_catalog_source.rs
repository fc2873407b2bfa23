//! Fake Catalog Source - 用于测试的目录来源
//!
//! 返回预置的目录文档并统计获取次数，不访问网络

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::ports::{CatalogError, CatalogSourcePort};

/// Fake Catalog Source
pub struct FakeCatalogSource {
    document: Mutex<Result<String, String>>,
    fetch_count: AtomicUsize,
}

impl FakeCatalogSource {
    /// 预置固定文档
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Ok(document.into())),
            fetch_count: AtomicUsize::new(0),
        }
    }

    /// 预置为获取失败
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Err(reason.into())),
            fetch_count: AtomicUsize::new(0),
        }
    }

    /// 替换文档内容
    pub fn set_document(&self, document: impl Into<String>) {
        *self.document.lock().unwrap() = Ok(document.into());
    }

    /// 已发生的获取次数
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSourcePort for FakeCatalogSource {
    async fn fetch_document(&self) -> Result<String, CatalogError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.document
            .lock()
            .unwrap()
            .clone()
            .map_err(CatalogError::Unavailable)
    }
}
