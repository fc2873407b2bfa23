//! Domain Layer - 领域层
//!
//! 包含:
//! - Voice Catalog Context: 语音目录模型与查询
//! - Audio: 音频值对象

pub mod audio;
pub mod voice;

pub use audio::{AudioChunk, AudioSpec};
