//! `POST /api/signup` and `POST /api/login`.
//!
//! Stateless: no session or token is issued. Auth outcomes (duplicate user, unknown user, wrong
//! password) are `200` with `ok:false`; only missing fields are `400`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use nova_core::{CredentialStore, NovaError, NovaResult};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{error_reply, parse_body};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    fn validated(self) -> Option<(String, String)> {
        let username = self.username.trim().to_string();
        let password = self.password.trim().to_string();
        if username.is_empty() || password.is_empty() {
            None
        } else {
            Some((username, password))
        }
    }
}

/// SQLite and Argon2 are blocking and CPU-heavy.
async fn with_store<T, F>(store: Arc<CredentialStore>, f: F) -> NovaResult<T>
where
    F: FnOnce(&CredentialStore) -> NovaResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| NovaError::Io(std::io::Error::other(e.to_string())))?
}

fn auth_failure(err: NovaError, context: &str) -> (StatusCode, Json<Value>) {
    let status = match err {
        NovaError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        NovaError::DuplicateUser(_) | NovaError::UserNotFound | NovaError::InvalidCredentials => {
            StatusCode::OK
        }
        _ => {
            tracing::error!("{}: {}", context, err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let message = match err {
        NovaError::DuplicateUser(_) | NovaError::UserNotFound | NovaError::InvalidCredentials => {
            err.user_message()
        }
        _ => format!("{}: {}", context, err.user_message()),
    };
    (status, Json(json!({ "ok": false, "message": message })))
}

pub async fn signup(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<Value>) {
    let Some((username, password)) = parse_body::<Credentials>(&body).validated() else {
        return error_reply(StatusCode::BAD_REQUEST, "username and password required");
    };
    match with_store(state.store.clone(), move |s| s.create(&username, &password)).await {
        Ok(created) => {
            tracing::info!("signup: {} (id {})", created.username, created.id);
            (
                StatusCode::OK,
                Json(json!({ "ok": true, "message": "user created" })),
            )
        }
        Err(e) => auth_failure(e, "error creating user"),
    }
}

pub async fn login(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<Value>) {
    let Some((username, password)) = parse_body::<Credentials>(&body).validated() else {
        return error_reply(StatusCode::BAD_REQUEST, "username and password required");
    };
    match with_store(state.store.clone(), move |s| s.verify(&username, &password)).await {
        Ok(auth) => {
            tracing::info!("login: {}", auth.username);
            (
                StatusCode::OK,
                Json(json!({ "ok": true, "message": "login successful" })),
            )
        }
        Err(e) => auth_failure(e, "login failed"),
    }
}
