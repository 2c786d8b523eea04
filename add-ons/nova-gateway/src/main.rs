//! Nova gateway: the assistant's HTTP face.
//!
//! - `POST /api/chat`: open/close apps or chat with the model; reply text is narrated in the background.
//! - `POST /api/say`, `POST /api/say_browser`: server-side narration, or MP3 back to the browser.
//! - `POST /api/signup`, `POST /api/login`: stateless account checks against the local user table.
//! - Anything else: static front-end files from `frontend_dir`.

mod handlers;
mod voice;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use nova_core::{
    default_launcher, CredentialStore, GeminiClient, IntentRouter, NovaConfig, NovaResult,
    ProcessController,
};
use nova_voice::Announcer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Shared by every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<NovaConfig>,
    pub store: Arc<CredentialStore>,
    pub router: Arc<IntentRouter>,
    pub announcer: Announcer,
}

impl AppState {
    pub fn new(
        config: NovaConfig,
        store: CredentialStore,
        router: IntentRouter,
        announcer: Announcer,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            router: Arc::new(router),
            announcer,
        }
    }

    /// Wire the production components from configuration.
    pub fn from_config(config: NovaConfig) -> NovaResult<Self> {
        let store = CredentialStore::new(&config.db_path)?;
        tracing::info!("User table ready at {}", store.path().display());

        let catalog = config.app_catalog();
        tracing::info!("{} application descriptors loaded", catalog.len());
        let controller = ProcessController::new(default_launcher(), catalog);

        let model = GeminiClient::from_config(&config);
        if !model.has_key() {
            tracing::warn!("GEMINI_API_KEY is not set; chat replies will report the missing key");
        }
        let router = IntentRouter::new(controller, Arc::new(model), config.persona.clone());

        let announcer = Announcer::new(voice::tts_from_config(&config), config.audio_dir());
        Ok(Self::new(config, store, router, announcer))
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[nova] .env not loaded ({}); using process environment", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("Nova gateway failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> NovaResult<()> {
    let config = NovaConfig::load()?;
    let addr = config.bind_addr();
    let greeting = config.startup_greeting.trim().to_string();
    let state = AppState::from_config(config)?;
    let announcer = state.announcer.clone();
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    tracing::info!("Nova listening on http://{}", addr);
    if !greeting.is_empty() {
        let _ = announcer.announce(greeting);
    }

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );
    tokio::select! {
        result = server => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested (Ctrl+C)");
        }
    }
    Ok(())
}

fn build_app(state: AppState) -> Router {
    let frontend_dir = state.config.frontend_dir.clone();
    let index_file = frontend_dir.join("index.html");

    Router::new()
        .route("/api/chat", post(handlers::chat::chat))
        .route("/api/say", post(handlers::speech::say))
        .route("/api/say_browser", post(handlers::speech::say_browser))
        .route("/api/signup", post(handlers::auth::signup))
        .route("/api/login", post(handlers::auth::login))
        .with_state(state)
        .route_service("/", ServeFile::new(index_file))
        .fallback_service(ServeDir::new(frontend_dir))
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(log_request))
}

/// One line per request. The peer is absent when the app is driven without a socket (tests).
async fn log_request(request: Request<Body>, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    tracing::info!("{} {} from {} -> {}", method, path, peer, response.status().as_u16());
    response
}
