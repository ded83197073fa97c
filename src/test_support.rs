// Shared fixtures for unit and router tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use parking_lot::Mutex;

use crate::error::PipelineError;
use crate::market_data::MarketDataSource;
use crate::types::PriceBar;

/// `n` weekday bars ending on 2024-05-31, with a wavy upward drift so every
/// indicator has something to chew on.
pub fn synthetic_bars(n: usize) -> Vec<PriceBar> {
    let mut dates = Vec::with_capacity(n);
    let mut day = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
    while dates.len() < n {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(day);
        }
        day -= Duration::days(1);
    }
    dates.reverse();

    dates
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let x = i as f64;
            let close = 3500.0 + x * 1.5 + (x * 0.45).sin() * 40.0;
            PriceBar {
                date,
                open: close - 5.0,
                high: close + 12.0,
                low: close - 15.0,
                close,
                volume: 1_000_000 + (i as u64 % 7) * 25_000,
            }
        })
        .collect()
}

/// In-memory `MarketDataSource`; unknown tickers get `NoData`.
#[derive(Default)]
pub struct FakeSource {
    bars: HashMap<String, Vec<PriceBar>>,
    last_range: Mutex<Option<(NaiveDate, NaiveDate)>>,
}

impl FakeSource {
    pub fn with_bars(ticker: &str, bars: Vec<PriceBar>) -> Self {
        let mut source = Self::default();
        source.bars.insert(ticker.to_string(), bars);
        source
    }

    pub fn last_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        *self.last_range.lock()
    }
}

#[async_trait]
impl MarketDataSource for FakeSource {
    async fn daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, PipelineError> {
        *self.last_range.lock() = Some((start, end));
        self.bars
            .get(ticker)
            .cloned()
            .ok_or_else(|| PipelineError::NoData(ticker.to_string()))
    }
}
