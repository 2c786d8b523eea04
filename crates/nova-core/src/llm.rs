//! Generative-AI completion behind the [`CompletionModel`] trait.
//!
//! [`GeminiClient`] talks to the Google `generateContent` JSON API. The key is passed as the
//! `key` query parameter, as the public REST API expects.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{NovaConfig, DEFAULT_GEMINI_API_BASE, DEFAULT_MODEL};
use crate::error::{NovaError, NovaResult};

#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Complete `prompt` and return the model's text. Every failure is `ExternalService`.
    async fn complete(&self, prompt: &str) -> NovaResult<String>;
}

pub type SharedModel = Arc<dyn CompletionModel>;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    api_base: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            client,
        }
    }

    pub fn from_config(config: &NovaConfig) -> Self {
        Self::new(config.gemini_api_key.clone())
            .with_model(&config.model)
            .with_api_base(&config.gemini_api_base)
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl CompletionModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> NovaResult<String> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| NovaError::ExternalService("GEMINI_API_KEY is not set".to_string()))?;

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };
        tracing::debug!("Gemini request to model {}", self.model);

        let res = self
            .client
            .post(self.endpoint())
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| NovaError::ExternalService(format!("request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(NovaError::ExternalService(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let raw = res
            .text()
            .await
            .map_err(|e| NovaError::ExternalService(format!("unreadable response: {}", e)))?;
        extract_text(&raw)
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(raw: &str) -> NovaResult<String> {
    let parsed: GenerateResponse = serde_json::from_str(raw)
        .map_err(|e| NovaError::ExternalService(format!("invalid response: {}", e)))?;
    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        return Err(NovaError::ExternalService("response contained no text".to_string()));
    }
    Ok(text.to_string())
}
