//! NurseSim API server
//!
//! Run with: cargo run -p nursesim-server

mod config;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use nursesim_llm::backend::GeminiBackend;
use nursesim_store::{CaseRepository, FileStore};
use nursesim_web::router::build_router;
use nursesim_web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nursesim=debug,info")),
        )
        .init();

    info!("🩺 NurseSim starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match config::Config::load() {
        Ok(c) => {
            info!("Configuration loaded. Model: {}, Store: {}", c.gemini.model, c.store.path);
            c
        }
        Err(e) => {
            tracing::warn!("Could not load nursesim.toml: {e}");
            tracing::warn!("Copy nursesim.example.toml to nursesim.toml and edit it.");
            return Ok(());
        }
    };

    // Open the case library
    let store = FileStore::open(&config.store.path)?;
    let cases = CaseRepository::open(Arc::new(store))?;
    info!("✅ Case library ready: {} cases.", cases.len().await);

    // Gemini oracle
    let api_key = std::env::var("NURSESIM_GEMINI_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .unwrap_or_else(|| config.gemini.api_key.clone());
    if api_key.is_empty() {
        tracing::warn!(
            "No Gemini API key configured! Set NURSESIM_GEMINI_API_KEY or gemini.api_key \
             in nursesim.toml. Patient replies, speech and grading will be unavailable."
        );
    }
    let oracle = GeminiBackend::new(api_key, config.gemini.model.clone())
        .with_tts_model(config.gemini.tts_model.clone())
        .with_image_model(config.gemini.image_model.clone())
        .with_voice(config.gemini.voice.clone());
    info!("✅ Oracle ready: {} (voice: {})", config.gemini.model, config.gemini.voice);

    // Build app state and router
    let state = AppState::new(cases, Arc::new(oracle));
    let router = build_router(state);

    // Start web server
    let bind_addr = std::env::var("NURSESIM_BIND")
        .unwrap_or_else(|_| config.server.bind.clone());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("🌐 API listening on http://{}", bind_addr);
    info!("   Case library: http://localhost:3000/api/cases");
    info!("   Sessions:     http://localhost:3000/api/sessions");
    info!("   Events:       http://localhost:3000/api/events");
    info!("");
    info!("🩺 NurseSim ready. Press Ctrl+C to stop.");

    axum::serve(listener, router).await?;

    Ok(())
}
