// =============================================================================
// Moving Average Convergence / Divergence (MACD)
// =============================================================================
//
//   line      = EMA(fast) - EMA(slow)
//   signal    = EMA(signal_period) of the line
//   histogram = line - signal
//
// With the standard (12, 26, 9) parameters the line is defined from close
// index 25 and the signal / histogram from index 33.
// =============================================================================

use super::ema::{calculate_ema, calculate_ema_sparse};

/// The three MACD columns, each aligned with the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// Compute MACD for `closes`.
///
/// Returns `None` (calculation failed) when any period is zero, when
/// `fast >= slow`, or when there are fewer closes than the slow period.
/// Otherwise every column has `closes.len()` entries, `None` during warm-up.
pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Option<MacdSeries> {
    if fast == 0 || signal_period == 0 || fast >= slow || closes.len() < slow {
        return None;
    }

    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);

    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some(f.as_ref()? - s.as_ref()?))
        .collect();

    let signal = calculate_ema_sparse(&line, signal_period);

    let histogram = line
        .iter()
        .zip(&signal)
        .map(|(l, s)| Some(l.as_ref()? - s.as_ref()?))
        .collect();

    Some(MacdSeries {
        line,
        signal,
        histogram,
    })
}
