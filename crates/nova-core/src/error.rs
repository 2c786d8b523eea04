//! Error types for the Nova assistant core

use thiserror::Error;

/// Result type alias for core operations
pub type NovaResult<T> = Result<T, NovaError>;

/// Everything that can go wrong between an inbound request and its reply.
#[derive(Error, Debug)]
pub enum NovaError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("user already exists: {0}")]
    DuplicateUser(String),

    #[error("user not found")]
    UserNotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("No configured path for {app} on {os}")]
    UnsupportedApp { app: String, os: String },

    #[error("{0}")]
    LaunchFailure(String),

    #[error("Error contacting Gemini API: {0}")]
    ExternalService(String),

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NovaError {
    /// Message placed in JSON reply bodies.
    ///
    /// Auth failures use the short phrases the front-end matches on; everything else is the
    /// `Display` rendering.
    pub fn user_message(&self) -> String {
        match self {
            NovaError::DuplicateUser(name) => {
                format!("error creating user: username '{}' already exists", name)
            }
            NovaError::UserNotFound => "user not found".to_string(),
            NovaError::InvalidCredentials => "invalid credentials".to_string(),
            other => other.to_string(),
        }
    }

    /// True for failures caused by the caller's input rather than by the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, NovaError::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_user_message_mentions_existing_name() {
        let msg = NovaError::DuplicateUser("alice".into()).user_message();
        assert!(msg.contains("alice"));
        assert!(msg.contains("already exists"));
    }

    #[test]
    fn unsupported_app_names_app_and_os() {
        let err = NovaError::UnsupportedApp {
            app: "chrome".into(),
            os: "Linux".into(),
        };
        assert_eq!(err.user_message(), "No configured path for chrome on Linux");
    }

    #[test]
    fn only_invalid_input_is_a_client_error() {
        assert!(NovaError::InvalidInput("empty prompt".into()).is_client_error());
        assert!(!NovaError::UserNotFound.is_client_error());
    }
}
