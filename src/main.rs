// =============================================================================
// tickerscope — Main Entry Point
// =============================================================================
//
// Thin startup sequence: load config, build the read-only app context, serve
// the REST API until a shutdown signal arrives. All per-request work happens
// in the handlers; there is no background state to tear down.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod config;
mod error;
mod indicators;
mod market_data;
mod recommendation;
mod yahoo;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::ServiceConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::var("TICKERSCOPE_CONFIG")
        .unwrap_or_else(|_| "service_config.json".to_string());

    let mut config = ServiceConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        ServiceConfig::default()
    });

    // Env overrides take precedence over the config file.
    if let Ok(addr) = std::env::var("TICKERSCOPE_BIND_ADDR") {
        config.bind_addr = addr;
    }
    if let Ok(origin) = std::env::var("TICKERSCOPE_ALLOWED_ORIGIN") {
        config.allowed_origin = origin;
    }
    if let Ok(url) = std::env::var("TICKERSCOPE_PROVIDER_URL") {
        config.provider_base_url = url;
    }

    info!(
        bind_addr = %config.bind_addr,
        provider = %config.provider_base_url,
        allowed_origin = %config.allowed_origin,
        "tickerscope starting"
    );

    // ── 2. Build shared context & router ─────────────────────────────────
    let state = Arc::new(AppState::new(config));
    let app = api::rest::router(state.clone());

    // ── 3. Serve until shutdown ──────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&state.config.bind_addr).await?;
    info!(addr = %state.config.bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("tickerscope shut down complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl+C handler");
        return;
    }
    warn!("Shutdown signal received — stopping gracefully");
}
