//! Piperline - 本地语音资产流水线
//!
//! 架构设计: 分层 + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Voice Catalog Context: 远端语音目录的强类型模型与纯查询
//! - Audio: 音频块与流格式值对象
//!
//! 应用层 (application/):
//! - Ports: 端口定义（CatalogSource, VoiceFetcher, Synthesizer, AudioOutput）
//! - VoiceCatalogClient: 目录获取、缓存与最佳匹配
//! - VoiceAssetManager: 模型文件下载与完整性校验
//! - Speaker: 流式合成播放状态机
//! - VoiceTools: 面向智能体的工具门面
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP 目录来源、HTTP 文件存储、Piper 合成引擎、
//!   Rodio 音频设备，以及各端口的 Fake 实现

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
