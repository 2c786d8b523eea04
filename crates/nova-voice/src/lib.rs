//! # Nova Voice
//!
//! Speech output for the assistant: pluggable [`TtsBackend`]s and the [`Announcer`] that narrates
//! replies without holding up the HTTP response.

pub mod announcer;
pub mod error;
pub mod tts;

pub use announcer::Announcer;
pub use error::{VoiceError, VoiceResult};
pub use tts::{
    split_for_tts, GoogleTranslateTts, OpenAiCompatibleTts, SharedTts, SilentTts, TtsBackend,
    MAX_CHUNK_CHARS,
};
