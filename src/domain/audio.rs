//! 音频值对象
//!
//! 合成流的基本单位：一段小端 16-bit PCM 样本及其流格式

use serde::{Deserialize, Serialize};

/// 音频流格式
///
/// 不变量: 由一次合成会话的首个块确定，会话内不再变化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSpec {
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道数 (1 = 单声道, 2 = 立体声交错)
    pub channels: u16,
}

impl std::fmt::Display for AudioSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Hz / {} ch", self.sample_rate, self.channels)
    }
}

/// 音频块
///
/// 立体声时左右声道样本交错排列
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    /// PCM 样本
    pub samples: Vec<i16>,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道数
    pub channels: u16,
}

impl AudioChunk {
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn spec(&self) -> AudioSpec {
        AudioSpec {
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    /// 块时长（毫秒）
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0;
        }
        let frames = self.samples.len() as u64 / self.channels as u64;
        frames * 1000 / self.sample_rate as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_spec() {
        let chunk = AudioChunk::new(vec![0; 441], 22050, 1);
        assert_eq!(
            chunk.spec(),
            AudioSpec {
                sample_rate: 22050,
                channels: 1
            }
        );
    }

    #[test]
    fn test_duration_mono() {
        // 22050 个样本 @ 22050 Hz 单声道 = 1 秒
        let chunk = AudioChunk::new(vec![0; 22050], 22050, 1);
        assert_eq!(chunk.duration_ms(), 1000);
    }

    #[test]
    fn test_duration_stereo_interleaved() {
        // 立体声交错: 每帧两个样本
        let chunk = AudioChunk::new(vec![0; 44100], 22050, 2);
        assert_eq!(chunk.duration_ms(), 1000);
    }

    #[test]
    fn test_duration_zero_rate() {
        let chunk = AudioChunk::new(vec![0; 100], 0, 1);
        assert_eq!(chunk.duration_ms(), 0);
    }
}
