//! Speaker - 流式合成播放
//!
//! 合成生产与播放消费在同一控制流中逐块交替：取一块、写一块，设备的
//! 硬件缓冲就是流控。生命周期: 空闲 → 首块到达时打开输出流 → 逐块
//! 写入 → 正常结束排空停止 / 用户中断立即丢弃 / 出错停止。
//! 所有失败路径都折叠为返回值，不向调用方抛出。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::application::ports::{AudioOutputPort, PlaybackError, PlaybackSession, SynthesizerPort};
use crate::domain::audio::AudioSpec;
use crate::domain::voice::LocalVoiceModel;

/// 回显给调用方的文本截断长度（字符）
const ECHO_MAX_CHARS: usize = 100;

/// 用户中断信号
///
/// 只在播放层逐块检查；触发后当前会话 abort，缓冲中未播放的音频丢弃
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// 一次 speak 调用的结果
///
/// 中断与失败都是普通返回值，不是异常
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// 播放完成；携带输入文本的截断回显
    Completed { spoken: String },
    /// 用户中断
    Interrupted,
    /// 合成或设备失败
    Failed { reason: String },
}

impl SpeakOutcome {
    /// 面向工具调用方的状态文本
    pub fn message(&self) -> String {
        match self {
            Self::Completed { spoken } => format!("Successfully spoke: {}", spoken),
            Self::Interrupted => "Speech interrupted by user".to_string(),
            Self::Failed { reason } => format!("Error speaking text: {}", reason),
        }
    }
}

/// 流式播放器
pub struct Speaker {
    synthesizer: Arc<dyn SynthesizerPort>,
    output: Arc<dyn AudioOutputPort>,
    /// 同一 Speaker 上的并发 speak 串行化
    playback_guard: Mutex<()>,
}

impl Speaker {
    pub fn new(synthesizer: Arc<dyn SynthesizerPort>, output: Arc<dyn AudioOutputPort>) -> Self {
        Self {
            synthesizer,
            output,
            playback_guard: Mutex::new(()),
        }
    }

    /// 合成 `text` 并实时播放
    ///
    /// 阻塞直到播放完成、被中断或失败；设备在每条退出路径上都被释放。
    /// 块序列为空（空文本或不可发声文本）时不打开设备，直接视为完成。
    pub fn speak(
        &self,
        text: &str,
        model: &LocalVoiceModel,
        interrupt: &InterruptFlag,
    ) -> SpeakOutcome {
        let _guard = self
            .playback_guard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let chunks = match self.synthesizer.synthesize(text, model) {
            Ok(chunks) => chunks,
            Err(e) => return SpeakOutcome::Failed {
                reason: e.to_string(),
            },
        };

        let mut session: Option<(Box<dyn PlaybackSession>, AudioSpec)> = None;
        let mut written = 0usize;

        for item in chunks {
            if interrupt.is_triggered() {
                if let Some((opened, _)) = session.take() {
                    opened.abort();
                }
                tracing::info!(chunks_written = written, "Speech playback interrupted");
                return SpeakOutcome::Interrupted;
            }

            let chunk = match item {
                Ok(chunk) => chunk,
                Err(e) => {
                    if let Some((opened, _)) = session.take() {
                        let _ = opened.finish();
                    }
                    return SpeakOutcome::Failed {
                        reason: e.to_string(),
                    };
                }
            };

            if session.is_none() {
                match self.output.open(chunk.spec()) {
                    Ok(opened) => {
                        tracing::debug!(spec = %chunk.spec(), "Playback stream opened");
                        session = Some((opened, chunk.spec()));
                    }
                    // 设备从未打开，无资源需要释放
                    Err(e) => {
                        return SpeakOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                }
            }

            let write_result = match session.as_mut() {
                Some((opened, spec)) if chunk.spec() == *spec => opened.write(&chunk),
                // 首块之后格式不再协商，变更视为会话失败
                _ => Err(PlaybackError::Write(format!(
                    "audio format changed mid-stream to {}",
                    chunk.spec()
                ))),
            };

            if let Err(e) = write_result {
                if let Some((opened, _)) = session.take() {
                    let _ = opened.finish();
                }
                return SpeakOutcome::Failed {
                    reason: e.to_string(),
                };
            }
            written += 1;
        }

        if let Some((opened, _)) = session.take() {
            if let Err(e) = opened.finish() {
                return SpeakOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        }

        tracing::info!(chunks_written = written, "Speech playback completed");
        SpeakOutcome::Completed {
            spoken: truncate_echo(text),
        }
    }
}

/// 输入文本的截断回显：前 100 个字符，超长时附省略号
fn truncate_echo(text: &str) -> String {
    let mut chars = text.chars();
    let echo: String = chars.by_ref().take(ECHO_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", echo)
    } else {
        echo
    }
}
