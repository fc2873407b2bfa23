//! Fake Synthesizer - 用于测试的合成引擎
//!
//! 按预置脚本产出音频块或错误，不依赖任何模型文件

use crate::application::ports::{AudioChunkStream, SynthesisError, SynthesizerPort};
use crate::domain::audio::AudioChunk;
use crate::domain::voice::LocalVoiceModel;

/// Fake Synthesizer
pub struct FakeSynthesizer {
    script: Vec<Result<AudioChunk, SynthesisError>>,
    open_error: Option<SynthesisError>,
}

impl FakeSynthesizer {
    /// 预置一串成功的块
    pub fn with_chunks(chunks: Vec<AudioChunk>) -> Self {
        Self {
            script: chunks.into_iter().map(Ok).collect(),
            open_error: None,
        }
    }

    /// 预置完整脚本（可包含中途错误）
    pub fn with_script(script: Vec<Result<AudioChunk, SynthesisError>>) -> Self {
        Self {
            script,
            open_error: None,
        }
    }

    /// 预置为会话打开即失败（模型加载失败）
    pub fn failing(error: SynthesisError) -> Self {
        Self {
            script: Vec::new(),
            open_error: Some(error),
        }
    }
}

impl SynthesizerPort for FakeSynthesizer {
    fn synthesize(
        &self,
        _text: &str,
        _model: &LocalVoiceModel,
    ) -> Result<AudioChunkStream, SynthesisError> {
        if let Some(error) = &self.open_error {
            return Err(error.clone());
        }
        Ok(Box::new(self.script.clone().into_iter()))
    }
}
