// =============================================================================
// Application State
// =============================================================================
//
// Shared by every request handler via `Arc<AppState>`. Nothing in here is
// mutated after startup; the export directory on disk is the only shared
// mutable resource.
// =============================================================================

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use crate::api::pages::Pages;
use crate::market_data::MarketDataSource;
use crate::runtime_config::RuntimeConfig;

pub struct AppState {
    pub config: RuntimeConfig,
    pub source: Arc<dyn MarketDataSource>,
    pub pages: Pages,
    /// Used for uptime reporting on /health.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig, source: Arc<dyn MarketDataSource>) -> Result<Self> {
        Ok(Self {
            config,
            source,
            pages: Pages::new()?,
            start_time: Instant::now(),
        })
    }
}
