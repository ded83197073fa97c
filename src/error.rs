// =============================================================================
// Pipeline errors
// =============================================================================
//
// Every failure between "ticker submitted" and "rows ready to export" is one
// of these. The /fetch handler logs the variant and shows the operator a
// single generic message regardless of which one occurred.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Provider answered but had no usable bars for the symbol.
    #[error("No data available for {0}.")]
    NoData(String),

    /// Transport failure or non-success status from the provider.
    #[error("market data provider error: {0}")]
    Provider(String),

    #[error("MACD calculation failed.")]
    MacdFailed,

    /// Indicators computed but no row survived the warm-up trim.
    #[error("insufficient history for {ticker}: {bars} bars, no complete indicator row")]
    InsufficientHistory { ticker: String, bars: usize },
}

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        Self::Provider(e.to_string())
    }
}
