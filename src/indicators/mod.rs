// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators written to the
// export document. Every function returns a column aligned with its input:
// one `Option<f64>` per close, `None` while the indicator is still warming up.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const SMA_PERIOD: usize = 20;
pub const EMA_PERIOD: usize = 10;
