//! Rodio Output - 本地音频设备播放适配器
//!
//! Sink 队列最多保留一个未播放块：写入阻塞到上一块基本播完，由硬件
//! 缓冲承担流控。abort 用 Sink::stop 丢弃缓冲，finish 用
//! sleep_until_end 排空。OutputStream 随会话 drop 释放设备。

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};
use std::time::Duration;

use crate::application::ports::{AudioOutputPort, PlaybackError, PlaybackSession};
use crate::domain::audio::{AudioChunk, AudioSpec};

/// 写入背压的轮询间隔
const BACKPRESSURE_POLL: Duration = Duration::from_millis(5);

/// Rodio 音频输出
#[derive(Debug, Default)]
pub struct RodioAudioOutput;

impl RodioAudioOutput {
    pub fn new() -> Self {
        Self
    }
}

impl AudioOutputPort for RodioAudioOutput {
    fn open(&self, spec: AudioSpec) -> Result<Box<dyn PlaybackSession>, PlaybackError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| PlaybackError::DeviceOpen(e.to_string()))?;
        let sink = Sink::try_new(&handle).map_err(|e| PlaybackError::DeviceOpen(e.to_string()))?;

        tracing::debug!(
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            "Audio output stream opened"
        );

        Ok(Box::new(RodioSession {
            _stream: stream,
            sink,
        }))
    }
}

struct RodioSession {
    // OutputStream 被 drop 时设备关闭，必须与 Sink 同生命周期持有
    _stream: OutputStream,
    sink: Sink,
}

impl PlaybackSession for RodioSession {
    fn write(&mut self, chunk: &AudioChunk) -> Result<(), PlaybackError> {
        let source = SamplesBuffer::new(chunk.channels, chunk.sample_rate, chunk.samples.clone());
        self.sink.append(source);

        // 单槽背压：最多一个整块在队列中等待
        while self.sink.len() > 1 {
            std::thread::sleep(BACKPRESSURE_POLL);
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<(), PlaybackError> {
        self.sink.sleep_until_end();
        Ok(())
    }

    fn abort(self: Box<Self>) {
        self.sink.stop();
    }
}
