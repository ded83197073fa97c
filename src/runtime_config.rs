// =============================================================================
// Runtime Configuration — JSON file + environment overrides
// =============================================================================
//
// All fields carry `#[serde(default)]` so that a partial (or empty) config
// file still loads. Environment variables win over the file so the service
// can be pointed elsewhere without editing it.
//
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Nifty 50 constituents offered in the ticker picker.
fn default_tickers() -> Vec<String> {
    [
        "TCS.NS",
        "INFY.NS",
        "HDFC.NS",
        "RELIANCE.NS",
        "ICICIBANK.NS",
        "HINDUNILVR.NS",
        "KOTAKBANK.NS",
        "BAJFINANCE.NS",
        "SBIN.NS",
        "ASIANPAINT.NS",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_lookback_days() -> i64 {
    365
}

fn default_provider_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Socket address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory export documents are written to and served from.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Symbols listed in the ticker picker. Any symbol can still be posted.
    #[serde(default = "default_tickers")]
    pub tickers: Vec<String>,

    /// Calendar days of history requested from the provider.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,

    /// Per-request timeout for the provider call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            export_dir: default_export_dir(),
            tickers: default_tickers(),
            lookback_days: default_lookback_days(),
            provider_base_url: default_provider_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            tickers = config.tickers.len(),
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Apply `TECHDATA_*` overrides from an environment lookup.
    ///
    /// Takes the lookup as a closure so tests don't have to mutate the real
    /// process environment.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = var("TECHDATA_BIND_ADDR").filter(|s| !s.trim().is_empty()) {
            self.bind_addr = addr.trim().to_string();
        }
        if let Some(dir) = var("TECHDATA_EXPORT_DIR").filter(|s| !s.trim().is_empty()) {
            self.export_dir = PathBuf::from(dir.trim());
        }
        if let Some(syms) = var("TECHDATA_TICKERS") {
            let tickers: Vec<String> = syms
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            if !tickers.is_empty() {
                self.tickers = tickers;
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
