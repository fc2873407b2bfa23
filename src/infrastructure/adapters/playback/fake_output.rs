//! Fake Audio Output - 用于测试的音频输出
//!
//! 记录设备生命周期事件（打开格式、写入、排空、丢弃），供测试断言
//! 设备只按预期打开且在每条路径上都被释放

use std::sync::{Arc, Mutex};

use crate::application::ports::{AudioOutputPort, PlaybackError, PlaybackSession};
use crate::domain::audio::{AudioChunk, AudioSpec};

/// 播放生命周期事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// 以给定格式打开输出流
    Opened(AudioSpec),
    /// 写入一块（记录样本数）
    Wrote(usize),
    /// 排空后停止
    Finished,
    /// 丢弃缓冲立即停止
    Aborted,
}

/// Fake Audio Output
#[derive(Default)]
pub struct FakeAudioOutput {
    events: Arc<Mutex<Vec<PlaybackEvent>>>,
    open_error: Option<PlaybackError>,
    write_error_at: Option<usize>,
}

impl FakeAudioOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置为设备打开即失败
    pub fn failing_open(error: PlaybackError) -> Self {
        Self {
            open_error: Some(error),
            ..Self::default()
        }
    }

    /// 预置为第 n 次写入失败（从 1 计）
    pub fn failing_write_at(n: usize) -> Self {
        Self {
            write_error_at: Some(n),
            ..Self::default()
        }
    }

    /// 已记录的事件序列
    pub fn events(&self) -> Vec<PlaybackEvent> {
        self.events.lock().unwrap().clone()
    }

    /// 设备打开次数
    pub fn open_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, PlaybackEvent::Opened(_)))
            .count()
    }

    /// 每次打开是否都以 Finished 或 Aborted 收尾（无资源泄漏）
    pub fn is_released(&self) -> bool {
        let events = self.events();
        let opened = events
            .iter()
            .filter(|e| matches!(e, PlaybackEvent::Opened(_)))
            .count();
        let closed = events
            .iter()
            .filter(|e| matches!(e, PlaybackEvent::Finished | PlaybackEvent::Aborted))
            .count();
        opened == closed
    }
}

impl AudioOutputPort for FakeAudioOutput {
    fn open(&self, spec: AudioSpec) -> Result<Box<dyn PlaybackSession>, PlaybackError> {
        if let Some(error) = &self.open_error {
            return Err(error.clone());
        }
        self.events.lock().unwrap().push(PlaybackEvent::Opened(spec));
        Ok(Box::new(FakeSession {
            events: self.events.clone(),
            write_error_at: self.write_error_at,
            writes: 0,
        }))
    }
}

struct FakeSession {
    events: Arc<Mutex<Vec<PlaybackEvent>>>,
    write_error_at: Option<usize>,
    writes: usize,
}

impl PlaybackSession for FakeSession {
    fn write(&mut self, chunk: &AudioChunk) -> Result<(), PlaybackError> {
        self.writes += 1;
        if self.write_error_at == Some(self.writes) {
            return Err(PlaybackError::Write("injected write failure".to_string()));
        }
        self.events
            .lock()
            .unwrap()
            .push(PlaybackEvent::Wrote(chunk.samples.len()));
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<(), PlaybackError> {
        self.events.lock().unwrap().push(PlaybackEvent::Finished);
        Ok(())
    }

    fn abort(self: Box<Self>) {
        self.events.lock().unwrap().push(PlaybackEvent::Aborted);
    }
}
