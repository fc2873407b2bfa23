//! Catalog Source Port - 远端语音目录抽象
//!
//! 目录是单个 JSON 文档；来源只负责取回原始文本，
//! 解析与校验由领域层完成

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::voice::CatalogParseError;

/// 目录错误
#[derive(Debug, Error)]
pub enum CatalogError {
    /// 网络或服务不可用
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// 文档或条目解析失败
    #[error("Catalog parse error: {0}")]
    Parse(#[from] CatalogParseError),

    /// 请求的语音不在目录中
    #[error("Voice not found in catalog: {0}")]
    VoiceNotFound(String),
}

/// Catalog Source Port
#[async_trait]
pub trait CatalogSourcePort: Send + Sync {
    /// 获取完整目录文档（原始 JSON 文本）
    async fn fetch_document(&self) -> Result<String, CatalogError>;
}
