//! **TTS backends** — text in, MP3 bytes out.
//!
//! - [`GoogleTranslateTts`]: keyless translate speech endpoint; long text is fetched in
//!   ≤100-character chunks and the MP3 frames are concatenated.
//! - [`OpenAiCompatibleTts`]: `POST {base}/audio/speech` (OpenAI, OpenRouter and compatible hosts).
//! - [`SilentTts`]: returns no audio; narration disabled.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{VoiceError, VoiceResult};

/// Longest text the translate endpoint accepts per request.
pub const MAX_CHUNK_CHARS: usize = 100;

const TRANSLATE_TTS_URL: &str = "https://translate.google.com/translate_tts";

/// Backend that turns text into MP3 bytes. An empty result means "nothing to play".
#[async_trait]
pub trait TtsBackend: Send + Sync {
    async fn synthesize(&self, text: &str) -> VoiceResult<Vec<u8>>;
}

pub type SharedTts = Arc<dyn TtsBackend>;

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentTts;

#[async_trait]
impl TtsBackend for SilentTts {
    async fn synthesize(&self, _text: &str) -> VoiceResult<Vec<u8>> {
        Ok(Vec::new())
    }
}

fn http_client() -> VoiceResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .map_err(|e| VoiceError::Tts(e.to_string()))
}

#[derive(Debug, Clone)]
pub struct GoogleTranslateTts {
    /// Language code, e.g. `en`.
    pub language: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GoogleTranslateTts {
    pub fn new(language: impl Into<String>) -> VoiceResult<Self> {
        let language = language.into();
        if language.trim().is_empty() {
            return Err(VoiceError::Config("TTS language must not be empty".to_string()));
        }
        Ok(Self {
            language: language.trim().to_string(),
            endpoint: TRANSLATE_TTS_URL.to_string(),
            client: http_client()?,
        })
    }

    /// Point at a different host (local mirror, test server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl TtsBackend for GoogleTranslateTts {
    async fn synthesize(&self, text: &str) -> VoiceResult<Vec<u8>> {
        let chunks = split_for_tts(text, MAX_CHUNK_CHARS);
        let total = chunks.len().to_string();
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            debug!("TTS chunk {}/{} ({} chars)", idx + 1, chunks.len(), chunk.chars().count());
            let idx = idx.to_string();
            let textlen = chunk.chars().count().to_string();
            let res = self
                .client
                .get(&self.endpoint)
                .query(&[
                    ("ie", "UTF-8"),
                    ("q", chunk.as_str()),
                    ("tl", self.language.as_str()),
                    ("client", "tw-ob"),
                    ("total", total.as_str()),
                    ("idx", idx.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await?;
            if !res.status().is_success() {
                let status = res.status();
                return Err(VoiceError::Tts(format!("translate TTS error {}", status)));
            }
            audio.extend_from_slice(&res.bytes().await?);
        }
        Ok(audio)
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleTts {
    /// Base URL without trailing slash (e.g. https://api.openai.com/v1).
    pub base_url: String,
    pub api_key: String,
    /// tts-1 (fast) or tts-1-hd.
    pub model: String,
    pub voice: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleTts {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        voice: impl Into<String>,
    ) -> VoiceResult<Self> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| VoiceError::Config("openai TTS requires tts_api_key".to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            voice: voice.into(),
            client: http_client()?,
        })
    }
}

#[async_trait]
impl TtsBackend for OpenAiCompatibleTts {
    async fn synthesize(&self, text: &str) -> VoiceResult<Vec<u8>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/audio/speech", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
            "voice": self.voice,
            "response_format": "mp3",
        });
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(VoiceError::Tts(format!("TTS API error {}: {}", status, body)));
        }
        Ok(res.bytes().await?.to_vec())
    }
}

/// Split `text` into pieces of at most `max_chars` characters, preferring to break after
/// sentence punctuation, then on whitespace. Words longer than `max_chars` are cut.
pub fn split_for_tts(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > max_chars {
            flush(&mut current, &mut chunks);
            let head: String = word.chars().take(max_chars).collect();
            word = word.chars().skip(max_chars).collect();
            chunks.push(head);
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars {
            flush(&mut current, &mut chunks);
        }
        if !current.is_empty() {
            current.push(' ');
        }
        let ends_sentence = word.ends_with(['.', '!', '?', ';', ':']);
        current.push_str(&word);
        // Prefer a natural pause when the chunk is already reasonably long.
        if ends_sentence && current.chars().count() * 2 >= max_chars {
            flush(&mut current, &mut chunks);
        }
    }
    flush(&mut current, &mut chunks);
    chunks
}

fn flush(current: &mut String, chunks: &mut Vec<String>) {
    if !current.is_empty() {
        chunks.push(std::mem::take(current));
    }
}
