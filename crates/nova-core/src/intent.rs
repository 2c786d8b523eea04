//! Intent Router: classify a free-text prompt and dispatch it.
//!
//! Classification is a prefix match on the first word. `open`/`launch` and `close`/`terminate`
//! (any casing) followed by a space and a non-blank target become app commands; everything else,
//! including a command word followed by a tab or newline, is chat.
//! The router holds no state between requests.

use crate::error::{NovaError, NovaResult};
use crate::llm::SharedModel;
use crate::process::ProcessController;

/// Classified purpose of one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    OpenApp { target: String },
    CloseApp { target: String },
    Chat { prompt: String },
}

impl Intent {
    pub fn classify(prompt: &str) -> Self {
        let trimmed = prompt.trim_start();
        if let Some((verb, rest)) = trimmed.split_once(' ') {
            let target = rest.trim();
            if !target.is_empty() {
                match verb.to_lowercase().as_str() {
                    "open" | "launch" => {
                        return Intent::OpenApp {
                            target: target.to_string(),
                        }
                    }
                    "close" | "terminate" => {
                        return Intent::CloseApp {
                            target: target.to_string(),
                        }
                    }
                    _ => {}
                }
            }
        }
        Intent::Chat {
            prompt: prompt.to_string(),
        }
    }
}

/// How a dispatched prompt ended. The gateway maps this to an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    InvalidInput,
    /// Open/close failed or the platform has no path for the app.
    ProcessFailure,
    /// The generative-AI provider call failed.
    ProviderFailure,
}

/// Text the assistant answers with, success or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub outcome: Outcome,
}

impl Reply {
    fn success(text: String) -> Self {
        Self {
            text,
            outcome: Outcome::Success,
        }
    }

    fn failure(err: &NovaError, outcome: Outcome) -> Self {
        Self {
            text: err.user_message(),
            outcome,
        }
    }

    pub fn ok(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// Build the text sent to the model for a chat turn.
pub fn persona_prompt(persona: &str, prompt: &str) -> String {
    format!("{}\nUser: {}\nNova:", persona, prompt)
}

#[derive(Clone)]
pub struct IntentRouter {
    controller: ProcessController,
    model: SharedModel,
    persona: String,
}

impl IntentRouter {
    pub fn new(controller: ProcessController, model: SharedModel, persona: impl Into<String>) -> Self {
        Self {
            controller,
            model,
            persona: persona.into(),
        }
    }

    pub fn controller(&self) -> &ProcessController {
        &self.controller
    }

    /// Classify and run `prompt`. Never fails: errors become the reply text.
    pub async fn dispatch(&self, prompt: &str) -> Reply {
        if prompt.trim().is_empty() {
            return Reply::failure(
                &NovaError::InvalidInput("empty prompt".to_string()),
                Outcome::InvalidInput,
            );
        }

        match Intent::classify(prompt) {
            Intent::OpenApp { target } => {
                let controller = self.controller.clone();
                match run_blocking(move || controller.open(&target)).await {
                    Ok(opened) => Reply::success(opened.message()),
                    Err(e) => Reply::failure(&e, process_outcome(&e)),
                }
            }
            Intent::CloseApp { target } => {
                let controller = self.controller.clone();
                match run_blocking(move || controller.close(&target)).await {
                    Ok(closed) => Reply::success(closed.message()),
                    Err(e) => Reply::failure(&e, process_outcome(&e)),
                }
            }
            Intent::Chat { prompt } => {
                let full = persona_prompt(&self.persona, &prompt);
                match self.model.complete(&full).await {
                    Ok(text) => Reply::success(text.trim().to_string()),
                    Err(e) => {
                        tracing::warn!("completion failed: {}", e);
                        let e = match e {
                            NovaError::ExternalService(_) => e,
                            other => NovaError::ExternalService(other.to_string()),
                        };
                        Reply::failure(&e, Outcome::ProviderFailure)
                    }
                }
            }
        }
    }
}

fn process_outcome(err: &NovaError) -> Outcome {
    if err.is_client_error() {
        Outcome::InvalidInput
    } else {
        Outcome::ProcessFailure
    }
}

/// Process control shells out and waits on kill commands; keep it off the async workers.
async fn run_blocking<T, F>(f: F) -> NovaResult<T>
where
    F: FnOnce() -> NovaResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| NovaError::LaunchFailure(format!("process task aborted: {}", e)))?
}
