// =============================================================================
// Market data sources
// =============================================================================
//
// The pipeline only ever asks one question of the outside world: "give me the
// daily bars for this ticker between these two dates". `MarketDataSource` is
// that seam; `yahoo::YahooClient` answers it in production.

pub mod yahoo;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::PipelineError;
use crate::types::PriceBar;

pub use yahoo::YahooClient;

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily bars for `ticker` with `start <= date < end`, oldest first.
    ///
    /// An unknown symbol or an empty response is `PipelineError::NoData`.
    async fn daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, PipelineError>;
}
