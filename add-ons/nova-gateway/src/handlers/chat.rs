//! `POST /api/chat`: route the prompt, reply with text, narrate it in the background.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use nova_core::Outcome;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{error_reply, parse_body};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub prompt: String,
}

fn status_for(outcome: Outcome) -> StatusCode {
    match outcome {
        Outcome::Success => StatusCode::OK,
        Outcome::InvalidInput => StatusCode::BAD_REQUEST,
        Outcome::ProcessFailure => StatusCode::INTERNAL_SERVER_ERROR,
        Outcome::ProviderFailure => StatusCode::BAD_GATEWAY,
    }
}

pub async fn chat(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<Value>) {
    let req: ChatRequest = parse_body(&body);
    let prompt = req.prompt.trim();
    if prompt.is_empty() {
        return error_reply(StatusCode::BAD_REQUEST, "empty prompt");
    }

    let reply = state.router.dispatch(prompt).await;
    if !reply.ok() {
        tracing::warn!("chat reply failed ({:?}): {}", reply.outcome, reply.text);
    }
    // Detached: the response never waits on narration.
    let _ = state.announcer.announce(reply.text.clone());

    (
        status_for(reply.outcome),
        Json(json!({ "ok": reply.ok(), "text": reply.text })),
    )
}
