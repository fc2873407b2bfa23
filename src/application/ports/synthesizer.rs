//! Synthesizer Port - 语音合成引擎抽象
//!
//! 同步接口：播放端一次拉取一块，合成与播放逐块耦合（单槽交接），
//! 不做预读缓冲

use thiserror::Error;

use crate::domain::audio::AudioChunk;
use crate::domain::voice::LocalVoiceModel;

/// 合成错误
#[derive(Debug, Clone, Error)]
pub enum SynthesisError {
    #[error("Failed to load voice model: {0}")]
    ModelLoad(String),

    #[error("Synthesis engine error: {0}")]
    Engine(String),
}

/// 一次合成会话的音频块序列
///
/// 惰性、单遍、不可重启；中途失败时已产出的块不会被收回
pub type AudioChunkStream = Box<dyn Iterator<Item = Result<AudioChunk, SynthesisError>> + Send>;

/// Synthesizer Port
pub trait SynthesizerPort: Send + Sync {
    /// 针对本地模型打开一次合成会话，按序覆盖完整输入文本
    fn synthesize(
        &self,
        text: &str,
        model: &LocalVoiceModel,
    ) -> Result<AudioChunkStream, SynthesisError>;
}
