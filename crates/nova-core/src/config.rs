//! Process configuration, loaded once at start-up.
//!
//! Sources, lowest to highest precedence: built-in defaults, the TOML file named by `NOVA_CONFIG`
//! (or `config/nova.toml`), `NOVA__*` environment variables, then the plain `PORT` and
//! `GEMINI_API_KEY` variables.
//!
//! | Key | Default |
//! |-----|---------|
//! | host | 127.0.0.1 |
//! | port | 5000 |
//! | db_path | users.db |
//! | frontend_dir | frontend |
//! | model | gemini-1.5-flash |
//! | tts_provider | google (google \| openai \| none) |
//! | startup_greeting | NOVA is ready. |

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::apps::{AppCatalog, AppDescriptor};
use crate::error::NovaResult;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DB_PATH: &str = "users.db";
pub const DEFAULT_FRONTEND_DIR: &str = "frontend";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TTS_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TTS_MODEL: &str = "tts-1";
pub const DEFAULT_TTS_VOICE: &str = "nova";
pub const DEFAULT_TTS_LANGUAGE: &str = "en";
pub const DEFAULT_STARTUP_GREETING: &str = "NOVA is ready.";

/// System persona prepended to every chat prompt.
pub const DEFAULT_PERSONA: &str = "You are Nova, a friendly AI assistant. \
If the user asks a casual question (like 'hi' or 'hello'), respond briefly and conversationally. \
If the user asks for help, code, or explanations, give a clear, well-structured answer.";

/// Which speech engine narrates replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    /// Keyless Google Translate speech endpoint.
    #[default]
    Google,
    /// OpenAI-compatible `/audio/speech` API.
    #[serde(alias = "open_ai")]
    OpenAi,
    /// Narration disabled.
    None,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

fn default_frontend_dir() -> PathBuf {
    PathBuf::from(DEFAULT_FRONTEND_DIR)
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_gemini_api_base() -> String {
    DEFAULT_GEMINI_API_BASE.to_string()
}

fn default_persona() -> String {
    DEFAULT_PERSONA.to_string()
}

fn default_tts_language() -> String {
    DEFAULT_TTS_LANGUAGE.to_string()
}

fn default_tts_api_url() -> String {
    DEFAULT_TTS_API_URL.to_string()
}

fn default_tts_model() -> String {
    DEFAULT_TTS_MODEL.to_string()
}

fn default_tts_voice() -> String {
    DEFAULT_TTS_VOICE.to_string()
}

fn default_startup_greeting() -> String {
    DEFAULT_STARTUP_GREETING.to_string()
}

/// Explicit configuration object shared by reference into router, controller and gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NovaConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// SQLite file holding the `users` table.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Directory served for `GET /` and `GET /<path>`.
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: PathBuf,

    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_gemini_api_base")]
    pub gemini_api_base: String,
    #[serde(default = "default_persona")]
    pub persona: String,

    #[serde(default)]
    pub tts_provider: TtsProvider,
    #[serde(default = "default_tts_language")]
    pub tts_language: String,
    #[serde(default = "default_tts_api_url")]
    pub tts_api_url: String,
    #[serde(default)]
    pub tts_api_key: Option<String>,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,
    /// Where narration MP3s are written. `None` means the OS temp dir.
    #[serde(default)]
    pub audio_dir: Option<PathBuf>,
    /// Spoken once the server is listening. Empty disables it.
    #[serde(default = "default_startup_greeting")]
    pub startup_greeting: String,

    /// Extra or overriding application descriptors, keyed by symbolic name.
    #[serde(default)]
    pub apps: HashMap<String, AppDescriptor>,
}

impl Default for NovaConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
            frontend_dir: default_frontend_dir(),
            gemini_api_key: None,
            model: default_model(),
            gemini_api_base: default_gemini_api_base(),
            persona: default_persona(),
            tts_provider: TtsProvider::default(),
            tts_language: default_tts_language(),
            tts_api_url: default_tts_api_url(),
            tts_api_key: None,
            tts_model: default_tts_model(),
            tts_voice: default_tts_voice(),
            audio_dir: None,
            startup_greeting: default_startup_greeting(),
            apps: HashMap::new(),
        }
    }
}

impl NovaConfig {
    /// Load `.env`, then the layered sources described in the module docs.
    pub fn load() -> NovaResult<Self> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!(".env not loaded: {} (using process environment)", e);
        }
        let config_path =
            std::env::var("NOVA_CONFIG").unwrap_or_else(|_| "config/nova.toml".to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Same as [`NovaConfig::load`] without touching `.env`; the file is optional.
    pub fn load_from(path: &Path) -> NovaResult<Self> {
        let builder = config::Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", DEFAULT_PORT as i64)?;

        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("NOVA").separator("__"))
            .set_override_option("port", env_opt_string("PORT"))?
            .set_override_option("gemini_api_key", env_opt_string("GEMINI_API_KEY"))?
            .build()?;

        let mut cfg: NovaConfig = built.try_deserialize()?;
        cfg.gemini_api_key = cfg
            .gemini_api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Ok(cfg)
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Built-in descriptors with the configured entries merged on top.
    pub fn app_catalog(&self) -> AppCatalog {
        AppCatalog::builtin().merged(self.apps.clone())
    }

    /// Directory for narration audio.
    pub fn audio_dir(&self) -> PathBuf {
        self.audio_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
