mod config;
mod errors;
mod extract;
mod llm_client;
mod models;
mod review;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, ProviderKind};
use crate::llm_client::build_provider;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; an unknown PROVIDER aborts startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Reviewer API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM provider (fixed for the life of the process)
    let provider =
        build_provider(&config.provider).context("Failed to initialize LLM provider")?;
    info!(
        "LLM provider initialized: {} (model: {})",
        provider.kind(),
        provider.model()
    );
    if provider.kind() == ProviderKind::OpenAi && config.provider.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; every review will return the fallback result");
    }

    let state = AppState {
        config: config.clone(),
        provider,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // development posture: any origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
