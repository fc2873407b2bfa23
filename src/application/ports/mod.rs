//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口。合成引擎与音频设备是同步端口
//! （播放端一次拉取一块，单槽交接）；目录与文件下载是异步端口。

mod audio_output;
mod catalog_source;
mod synthesizer;
mod voice_fetcher;

pub use audio_output::{AudioOutputPort, PlaybackError, PlaybackSession};
pub use catalog_source::{CatalogError, CatalogSourcePort};
pub use synthesizer::{AudioChunkStream, SynthesisError, SynthesizerPort};
pub use voice_fetcher::{DownloadError, ProgressTicker, VoiceFetcherPort};
