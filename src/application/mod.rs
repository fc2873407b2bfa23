//! 应用层 - 用例编排
//!
//! 包含:
//! - ports: 六边形架构端口定义（CatalogSource、VoiceFetcher、Synthesizer、AudioOutput）
//! - catalog: 目录客户端（缓存 + TTL + 最佳匹配）
//! - assets: 语音资产管理（下载 + 完整性校验）
//! - speaker: 流式合成播放状态机
//! - tools: 面向智能体的工具门面

pub mod ports;

mod assets;
mod catalog;
mod speaker;
mod tools;

pub use assets::{AssetError, VoiceAssetManager};
pub use catalog::{CatalogClientConfig, VoiceCatalogClient};
pub use speaker::{InterruptFlag, SpeakOutcome, Speaker};
pub use tools::{VoiceTools, VoiceToolsConfig};
