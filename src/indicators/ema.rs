// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The very first EMA value is seeded with the SMA of the first `period` closes.
// =============================================================================

/// Compute the EMA column for `closes` with look-back `period`.
///
/// The output has the same length as `closes`. Index `i` holds the EMA ending
/// at close `i`; the first `period - 1` slots are `None` (warm-up).
///
/// # Edge cases
/// - `period == 0` or `closes.len() < period` => all `None`
/// - A non-finite intermediate value ends the series; every later slot stays
///   `None` because the recursion cannot recover from it.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return result;
    }

    let multiplier = 2.0 / (period + 1) as f64;

    // Seed: SMA of the first `period` values.
    let sma: f64 = closes[..period].iter().sum::<f64>() / period as f64;
    if !sma.is_finite() {
        return result;
    }
    result[period - 1] = Some(sma);

    let mut prev_ema = sma;
    for (i, &close) in closes.iter().enumerate().skip(period) {
        let ema = close * multiplier + prev_ema * (1.0 - multiplier);
        if !ema.is_finite() {
            break;
        }
        result[i] = Some(ema);
        prev_ema = ema;
    }

    result
}

/// EMA over a column that itself has a warm-up prefix (e.g. the MACD line).
///
/// Leading `None`s are skipped and the EMA is seeded from the first `period`
/// defined values; the output stays aligned with `values`.
pub fn calculate_ema_sparse(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    let Some(start) = values.iter().position(Option::is_some) else {
        return result;
    };

    // Defined run after the warm-up; stops at the first gap.
    let run: Vec<f64> = values[start..].iter().map_while(|v| *v).collect();
    for (offset, v) in calculate_ema(&run, period).into_iter().enumerate() {
        result[start + offset] = v;
    }
    result
}
