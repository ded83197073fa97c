// =============================================================================
// Shared types used across the technical-data exporter
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data as delivered by the market-data provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// A price bar extended with every computed indicator.
///
/// Only built for days where all indicators are defined, so none of the
/// fields can be missing. The serde names are the keys written to the export
/// document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: u64,
    #[serde(rename = "RSI")]
    pub rsi: f64,
    #[serde(rename = "MACD")]
    pub macd: f64,
    #[serde(rename = "MACD_Signal")]
    pub macd_signal: f64,
    #[serde(rename = "MACD_Histogram")]
    pub macd_histogram: f64,
    #[serde(rename = "SMA_20")]
    pub sma_20: f64,
    #[serde(rename = "EMA_10")]
    pub ema_10: f64,
}

impl IndicatorRow {
    /// Column headers in export order, used by the HTML table.
    pub const COLUMNS: [&'static str; 12] = [
        "Date",
        "Open",
        "High",
        "Low",
        "Close",
        "Volume",
        "RSI",
        "MACD",
        "MACD_Signal",
        "MACD_Histogram",
        "SMA_20",
        "EMA_10",
    ];

    /// Render every column as display text, in [`Self::COLUMNS`] order.
    pub fn display_cells(&self) -> Vec<String> {
        let mut cells = vec![self.date.to_string()];
        cells.extend(
            [self.open, self.high, self.low, self.close]
                .iter()
                .map(|v| format!("{v:.6}")),
        );
        cells.push(self.volume.to_string());
        cells.extend(
            [
                self.rsi,
                self.macd,
                self.macd_signal,
                self.macd_histogram,
                self.sma_20,
                self.ema_10,
            ]
            .iter()
            .map(|v| format!("{v:.6}")),
        );
        cells
    }
}
