// =============================================================================
// Indicator pipeline — bars in, trailing indicator window out
// =============================================================================
//
//   fetch 1y of daily bars -> RSI / MACD / SMA / EMA columns
//     -> drop rows with any missing value -> keep the last TRAILING_ROWS
//
// The warm-up trim is driven by MACD: its signal line first exists on close
// index 33, so a ticker needs 38 bars to fill a full window.
// =============================================================================

use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::indicators::{
    ema::calculate_ema, macd::calculate_macd, rsi::calculate_rsi, sma::calculate_sma,
    EMA_PERIOD, MACD_FAST, MACD_SIGNAL, MACD_SLOW, RSI_PERIOD, SMA_PERIOD,
};
use crate::market_data::MarketDataSource;
use crate::types::{IndicatorRow, PriceBar};

/// Number of most recent sessions exported.
pub const TRAILING_ROWS: usize = 5;

/// Upper bound on the configured lookback, keeps date arithmetic in range.
const MAX_LOOKBACK_DAYS: i64 = 36_500;

/// Compute every indicator over `bars` and return the rows where all of them
/// are defined, oldest first.
///
/// Fails with `NoData` on an empty input and `MacdFailed` when the series is
/// too short for MACD to be computed at all.
pub fn build_indicator_rows(
    ticker: &str,
    bars: &[PriceBar],
) -> Result<Vec<IndicatorRow>, PipelineError> {
    if bars.is_empty() {
        return Err(PipelineError::NoData(ticker.to_string()));
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let rsi = calculate_rsi(&closes, RSI_PERIOD);
    let macd = calculate_macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL)
        .ok_or(PipelineError::MacdFailed)?;
    let sma = calculate_sma(&closes, SMA_PERIOD);
    let ema = calculate_ema(&closes, EMA_PERIOD);

    let rows: Vec<IndicatorRow> = bars
        .iter()
        .enumerate()
        .filter_map(|(i, bar)| {
            Some(IndicatorRow {
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                rsi: rsi[i]?,
                macd: macd.line[i]?,
                macd_signal: macd.signal[i]?,
                macd_histogram: macd.histogram[i]?,
                sma_20: sma[i]?,
                ema_10: ema[i]?,
            })
        })
        .collect();

    debug!(ticker, bars = bars.len(), rows = rows.len(), "indicators computed");
    Ok(rows)
}

/// Keep the last `TRAILING_ROWS` rows, newest last.
pub fn trailing_window(mut rows: Vec<IndicatorRow>) -> Vec<IndicatorRow> {
    let excess = rows.len().saturating_sub(TRAILING_ROWS);
    rows.drain(..excess);
    rows
}

/// Run the whole pipeline for `ticker`, looking back `lookback_days` from
/// `today` (exclusive).
///
/// A history too short to produce a single complete row is reported as
/// `InsufficientHistory`; one that produces fewer than `TRAILING_ROWS` rows is
/// returned as-is.
pub async fn fetch_trailing_window(
    source: &dyn MarketDataSource,
    ticker: &str,
    lookback_days: i64,
    today: NaiveDate,
) -> Result<Vec<IndicatorRow>, PipelineError> {
    let lookback = Duration::days(lookback_days.clamp(1, MAX_LOOKBACK_DAYS));
    let start = today.checked_sub_signed(lookback).unwrap_or(NaiveDate::MIN);

    let bars = source.daily_bars(ticker, start, today).await?;
    let rows = build_indicator_rows(ticker, &bars)?;
    if rows.is_empty() {
        return Err(PipelineError::InsufficientHistory {
            ticker: ticker.to_string(),
            bars: bars.len(),
        });
    }

    let window = trailing_window(rows);
    if window.len() < TRAILING_ROWS {
        warn!(
            ticker,
            rows = window.len(),
            bars = bars.len(),
            "short history, exporting a partial window"
        );
    }
    Ok(window)
}
