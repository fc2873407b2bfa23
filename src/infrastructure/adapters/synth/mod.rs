//! Synthesizer Adapters

mod fake_synthesizer;
#[cfg(feature = "piper")]
mod piper_synthesizer;

pub use fake_synthesizer::FakeSynthesizer;
#[cfg(feature = "piper")]
pub use piper_synthesizer::PiperSynthesizer;
