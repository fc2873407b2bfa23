//! Piper Synthesizer - piper-rs 合成引擎适配器
//!
//! 从模型配置 JSON 加载 Piper 语音，在独立线程上驱动引擎，经容量为 1
//! 的同步通道逐块交付（单槽交接：消费端不取走上一块，生产端就阻塞）。
//! Piper 输出为单声道，采样率取自模型配置。

use piper_rs::synth::PiperSpeechSynthesizer;
use serde::Deserialize;
use std::path::Path;
use std::sync::mpsc;

use crate::application::ports::{AudioChunkStream, SynthesisError, SynthesizerPort};
use crate::domain::audio::AudioChunk;
use crate::domain::voice::LocalVoiceModel;

/// Piper 合成引擎
#[derive(Debug, Default)]
pub struct PiperSynthesizer;

impl PiperSynthesizer {
    pub fn new() -> Self {
        Self
    }
}

impl SynthesizerPort for PiperSynthesizer {
    fn synthesize(
        &self,
        text: &str,
        model: &LocalVoiceModel,
    ) -> Result<AudioChunkStream, SynthesisError> {
        let sample_rate = read_sample_rate(model.config_path())?;

        let voice = piper_rs::from_config_path(model.config_path())
            .map_err(|e| SynthesisError::ModelLoad(e.to_string()))?;
        let synthesizer = PiperSpeechSynthesizer::new(voice)
            .map_err(|e| SynthesisError::ModelLoad(e.to_string()))?;

        tracing::debug!(
            voice = %model.voice_key(),
            sample_rate,
            "Piper synthesis session opened"
        );

        let text = text.to_string();
        let (tx, rx) = mpsc::sync_channel::<Result<AudioChunk, SynthesisError>>(1);

        std::thread::spawn(move || {
            let stream = match synthesizer.synthesize_parallel(text, None) {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = tx.send(Err(SynthesisError::Engine(e.to_string())));
                    return;
                }
            };

            for part in stream {
                let item = part
                    .map(|samples| AudioChunk::new(to_i16(&samples.into_vec()), sample_rate, 1))
                    .map_err(|e| SynthesisError::Engine(e.to_string()));
                let failed = item.is_err();
                // 消费端提前放弃（中断）时发送失败，直接收线程
                if tx.send(item).is_err() || failed {
                    return;
                }
            }
        });

        Ok(Box::new(rx.into_iter()))
    }
}

/// 模型配置中的音频段
#[derive(Debug, Deserialize)]
struct PiperAudioConfig {
    sample_rate: u32,
}

#[derive(Debug, Deserialize)]
struct PiperModelConfig {
    audio: PiperAudioConfig,
}

fn read_sample_rate(config_path: &Path) -> Result<u32, SynthesisError> {
    let raw = std::fs::read_to_string(config_path)
        .map_err(|e| SynthesisError::ModelLoad(e.to_string()))?;
    let config: PiperModelConfig = serde_json::from_str(&raw)
        .map_err(|e| SynthesisError::ModelLoad(format!("invalid model config: {}", e)))?;
    Ok(config.audio.sample_rate)
}

fn to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
        .collect()
}
