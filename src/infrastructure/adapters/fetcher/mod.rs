//! Voice Fetcher Adapters

mod fake_voice_fetcher;
mod http_voice_fetcher;

pub use fake_voice_fetcher::FakeVoiceFetcher;
pub use http_voice_fetcher::{HttpVoiceFetcher, HttpVoiceFetcherConfig};
