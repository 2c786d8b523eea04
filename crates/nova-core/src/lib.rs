//! # Nova Core
//!
//! Everything the assistant does between an inbound request and its reply, minus HTTP and speech:
//!
//! - [`config`]: layered configuration, built once and shared.
//! - [`credentials`]: SQLite account store with Argon2id password hashes.
//! - [`apps`] and [`process`]: descriptor map and per-platform open/close.
//! - [`intent`]: prompt classification and dispatch.
//! - [`llm`]: the generative-AI completion client.

pub mod apps;
pub mod config;
pub mod credentials;
pub mod error;
pub mod intent;
pub mod llm;
pub mod process;

pub use apps::{AppCatalog, AppDescriptor, OsFamily};
pub use config::{NovaConfig, TtsProvider};
pub use credentials::{Authenticated, Created, CredentialStore};
pub use error::{NovaError, NovaResult};
pub use intent::{Intent, IntentRouter, Outcome, Reply};
pub use llm::{CompletionModel, GeminiClient, SharedModel};
pub use process::{
    default_launcher, Closed, Opened, ProcessController, ProcessLauncher, SharedLauncher,
    TerminateOutcome,
};
