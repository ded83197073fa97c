// =============================================================================
// Technical Data Export — Main Entry Point
// =============================================================================
//
// Serves a small form: pick a ticker, get the last five sessions of price +
// indicator data as a table and as a downloadable JSON document.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod error;
mod export;
mod indicators;
mod market_data;
mod pipeline;
mod runtime_config;
mod types;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::market_data::YahooClient;
use crate::runtime_config::RuntimeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("TECHDATA_CONFIG").unwrap_or_else(|_| "techdata_config.json".into());
    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env(|key| std::env::var(key).ok());

    info!(
        tickers = ?config.tickers,
        export_dir = %config.export_dir.display(),
        lookback_days = config.lookback_days,
        "Configuration ready"
    );

    // ── 2. Market data provider ──────────────────────────────────────────
    let source = Arc::new(YahooClient::new(
        &config.provider_base_url,
        config.request_timeout(),
    )?);

    // ── 3. Shared state & router ─────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, source)?);
    let app = api::rest::router(state);

    // ── 4. Serve until Ctrl+C ────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
            }
            warn!("Shutdown signal received — stopping gracefully");
        })
        .await
        .context("HTTP server failed")?;

    info!("Shut down complete.");
    Ok(())
}
