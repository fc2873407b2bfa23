//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现。每个端口都有一个真实适配器和一个 Fake
//! 实现（测试用）；重原生依赖的适配器按 feature 编译。

pub mod catalog;
pub mod fetcher;
pub mod playback;
pub mod synth;

pub use catalog::{FakeCatalogSource, HttpCatalogSource, HttpCatalogSourceConfig};
pub use fetcher::{FakeVoiceFetcher, HttpVoiceFetcher, HttpVoiceFetcherConfig};
pub use playback::{FakeAudioOutput, PlaybackEvent};
pub use synth::FakeSynthesizer;

#[cfg(feature = "playback")]
pub use playback::RodioAudioOutput;
#[cfg(feature = "piper")]
pub use synth::PiperSynthesizer;
