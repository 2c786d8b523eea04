//! `POST /api/say` narrates on the server; `POST /api/say_browser` returns the MP3 to the caller.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use nova_core::NovaError;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{error_reply, parse_body};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SayRequest {
    pub text: String,
}

pub async fn say(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<Value>) {
    let req: SayRequest = parse_body(&body);
    let text = req.text.trim();
    if text.is_empty() {
        return error_reply(StatusCode::BAD_REQUEST, "missing text");
    }
    let _ = state.announcer.announce(text);
    (StatusCode::OK, Json(json!({ "ok": true, "text": "speaking" })))
}

pub async fn say_browser(State(state): State<AppState>, body: Bytes) -> Response {
    let req: SayRequest = parse_body(&body);
    let text = req.text.trim();
    if text.is_empty() {
        return error_reply(StatusCode::BAD_REQUEST, "missing text").into_response();
    }
    match state.announcer.render_to_temp(text).await {
        Ok(audio) => ([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response(),
        Err(e) => {
            let err = NovaError::Synthesis(e.to_string());
            tracing::warn!("say_browser: {}", err);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, err.user_message()).into_response()
        }
    }
}
