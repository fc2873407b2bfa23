//! Audio Output Adapters

mod fake_output;
#[cfg(feature = "playback")]
mod rodio_output;

pub use fake_output::{FakeAudioOutput, PlaybackEvent};
#[cfg(feature = "playback")]
pub use rodio_output::RodioAudioOutput;
