// =============================================================================
// Yahoo Finance chart client — daily OHLCV history
// =============================================================================
//
// GET {base}/v8/finance/chart/{ticker}?period1=..&period2=..&interval=1d
//
// The chart endpoint answers with parallel arrays (one timestamp array and one
// array per OHLCV field, nested under `indicators.quote[0]`). They are zipped
// back into one `PriceBar` per day here; a day where the provider left any
// field `null` is dropped. Timestamps are shifted by the exchange `gmtoffset`
// so that dates are the exchange's trading days, not UTC days.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::MarketDataSource;
use crate::error::PipelineError;
use crate::types::PriceBar;

/// Yahoo rejects requests without a browser-like user agent.
const CLIENT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) techdata-export/1.0";

/// Yahoo Finance REST client for daily chart data.
#[derive(Clone)]
pub struct YahooClient {
    base_url: Url,
    client: reqwest::Client,
}

impl YahooClient {
    /// Create a client against `base_url` (e.g. `https://query1.finance.yahoo.com`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid provider base url {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("provider base url {base_url} cannot carry a path");
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %base_url, "YahooClient initialised");

        Ok(Self { base_url, client })
    }

    fn chart_url(&self, ticker: &str) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base url can always carry path segments.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart", ticker]);
        }
        url
    }
}

#[async_trait]
impl MarketDataSource for YahooClient {
    #[instrument(skip(self), name = "yahoo::daily_bars")]
    async fn daily_bars(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, PipelineError> {
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end.and_time(NaiveTime::MIN).and_utc().timestamp();

        let resp = self
            .client
            .get(self.chart_url(ticker))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        let bars = decode_chart(ticker, status, &body, start, end)?;
        debug!(ticker, bars = bars.len(), "chart data retrieved");
        Ok(bars)
    }
}

/// Classify a chart response and keep the bars dated in `[start, end)`.
///
/// Unknown symbols come back as 404 with a well-formed `chart.error`, so the
/// envelope is tried before the status code is judged.
fn decode_chart(
    ticker: &str,
    status: StatusCode,
    body: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PriceBar>, PipelineError> {
    match serde_json::from_str::<ChartEnvelope>(body) {
        Ok(envelope) => {
            let bars = parse_chart(ticker, envelope)?;
            Ok(bars.into_iter().filter(|b| b.date >= start && b.date < end).collect())
        }
        Err(e) if status.is_success() => Err(PipelineError::Provider(format!(
            "malformed chart response: {e}"
        ))),
        Err(_) => Err(PipelineError::Provider(format!(
            "chart request returned {status}"
        ))),
    }
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds (19800 for NSE).
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Flatten a chart response into price bars, oldest first.
fn parse_chart(ticker: &str, envelope: ChartEnvelope) -> Result<Vec<PriceBar>, PipelineError> {
    if let Some(err) = envelope.chart.error {
        warn!(
            ticker,
            code = err.code.as_deref().unwrap_or("-"),
            description = err.description.as_deref().unwrap_or("-"),
            "provider reported an error"
        );
        return Err(PipelineError::NoData(ticker.to_string()));
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(PipelineError::NoData(ticker.to_string()));
    };
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Err(PipelineError::NoData(ticker.to_string()));
    };

    let offset = result.meta.gmtoffset;
    fn field(col: &[Option<f64>], i: usize) -> Option<f64> {
        col.get(i).copied().flatten()
    }

    let mut bars: Vec<PriceBar> = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            field(&quote.open, i),
            field(&quote.high, i),
            field(&quote.low, i),
            field(&quote.close, i),
            field(&quote.volume, i),
        ) else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        // A live session can be reported twice; keep the later one.
        if bars.last().is_some_and(|b| b.date == date) {
            bars.pop();
        }
        bars.push(PriceBar {
            date,
            open,
            high,
            low,
            close,
            volume: volume.max(0.0).round() as u64,
        });
    }

    if bars.is_empty() {
        return Err(PipelineError::NoData(ticker.to_string()));
    }
    Ok(bars)
}
