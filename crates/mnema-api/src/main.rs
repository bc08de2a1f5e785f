//! mnema-api - HTTP API server for mnema

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use mnema_api::{app, AppState};
use mnema_core::{defaults, GenerationBackend};
use mnema_inference::{
    HttpPerceptionBackend, HttpSpeechBackend, MemoryMetadataStore, MemoryObjectStorage,
    OllamaGenerationBackend, StaticTokenIdentity,
};
use mnema_pipeline::Collaborators;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // RUST_LOG controls the filter (default: "mnema_api=debug,tower_http=debug")
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mnema_api=debug,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let token = std::env::var(defaults::ENV_API_TOKEN)
        .map_err(|_| anyhow::anyhow!("{} must be set", defaults::ENV_API_TOKEN))?;

    let generation = OllamaGenerationBackend::from_env();
    let perception = HttpPerceptionBackend::from_env();
    let speech = HttpSpeechBackend::from_env();

    if !generation.health_check().await.unwrap_or(false) {
        warn!("Generation backend is not reachable; model endpoints will degrade to fallbacks");
    }

    // Single-user local deployment: one fixed caller owns everything,
    // metadata and objects live in process memory.
    let collab = Collaborators {
        identity: Arc::new(StaticTokenIdentity::new(token, Uuid::new_v4())),
        metadata: Arc::new(MemoryMetadataStore::new()),
        storage: Arc::new(MemoryObjectStorage::new()),
        generation: Arc::new(generation),
        perception: Arc::new(perception),
        speech: Arc::new(speech),
    };

    let router = app(AppState { collab });

    let bind = std::env::var(defaults::ENV_BIND_ADDR)
        .unwrap_or_else(|_| defaults::BIND_ADDR.to_string());
    let addr: SocketAddr = bind.parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
