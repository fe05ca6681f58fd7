mod config;
mod errors;
mod extraction;
mod interview;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::interview::orchestrator::Interviewer;
use crate::interview::session::SessionStore;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interviewer API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize generator client
    let generator = GeminiClient::new(
        config.gemini_api_key.clone(),
        &config.gemini_base_url,
        config.gemini_model.clone(),
        config.generator_timeout,
    )
    .context("Failed to initialize generator client")?;
    info!("Generator client initialized (model: {})", generator.model());

    let store = Arc::new(SessionStore::new(config.session_idle_ttl));
    match config.session_idle_ttl {
        Some(ttl) => info!("Session idle TTL: {}s", ttl.as_secs()),
        None => info!("Session idle eviction disabled"),
    }

    let state = AppState {
        interviewer: Arc::new(Interviewer::new(
            store,
            Arc::new(generator),
            config.question_count,
        )),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
