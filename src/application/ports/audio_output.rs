//! Audio Output Port - 音频输出设备抽象
//!
//! 会话生命周期: open(首块格式) 即分配并启动输出流 → write 逐块阻塞
//! 写入 → finish 排空后停止，或 abort 丢弃缓冲立即停止。
//! 任一路径都释放设备，流不跨调用共享或复用。

use thiserror::Error;

use crate::domain::audio::{AudioChunk, AudioSpec};

/// 播放错误
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("Failed to open audio device: {0}")]
    DeviceOpen(String),

    #[error("Audio write failed: {0}")]
    Write(String),
}

/// 一次播放会话独占的设备流
pub trait PlaybackSession {
    /// 写入一块音频；阻塞直到设备接受数据（硬件缓冲即背压）
    fn write(&mut self, chunk: &AudioChunk) -> Result<(), PlaybackError>;

    /// 排空已缓冲音频后停止并释放设备
    fn finish(self: Box<Self>) -> Result<(), PlaybackError>;

    /// 立即停止：丢弃已缓冲未播放的音频并释放设备
    fn abort(self: Box<Self>);
}

/// Audio Output Port
pub trait AudioOutputPort: Send + Sync {
    /// 按给定格式打开并启动一条输出流
    fn open(&self, spec: AudioSpec) -> Result<Box<dyn PlaybackSession>, PlaybackError>;
}
