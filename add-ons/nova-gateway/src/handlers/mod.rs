//! HTTP handlers. Each returns a `(StatusCode, Json)` pair or a raw response.

pub mod auth;
pub mod chat;
pub mod speech;

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// Decode a JSON body. A missing, malformed or wrongly-typed body yields the default (all fields
/// empty), so validation reports the missing field instead of a parse error.
pub(crate) fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    if body.is_empty() {
        return T::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::debug!("unparsable request body: {}", e);
        T::default()
    })
}

pub(crate) fn error_reply(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "ok": false, "error": message.into() })))
}
