// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Seed average gain / average loss with the SMA of the first `period`
//          gains / losses.
// Step 3 — Apply Wilder's exponential smoothing:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
// =============================================================================

/// Compute the RSI column for `closes` and `period`.
///
/// The output has the same length as `closes`. The first `period` slots are
/// `None`: `period` deltas are needed to seed the averages, so the first value
/// lands on close index `period`.
///
/// # Edge cases
/// - `period == 0` or `closes.len() < period + 1` => all `None`
/// - If average loss is zero (no down moves), RSI is 100.0.
/// - A non-finite result ends the series; later slots stay `None`.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return result;
    }

    // --- Compute price deltas ------------------------------------------------
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    // --- Seed averages with SMA of first `period` deltas ---------------------
    let (sum_gain, sum_loss) = deltas[..period].iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
        if d > 0.0 {
            (g + d, l)
        } else {
            (g, l + d.abs())
        }
    });

    let period_f = period as f64;
    let mut avg_gain = sum_gain / period_f;
    let mut avg_loss = sum_loss / period_f;

    let Some(first) = rsi_from_averages(avg_gain, avg_loss) else {
        return result;
    };
    result[period] = Some(first);

    // --- Wilder's smoothing for subsequent values ----------------------------
    // Delta `i` ends at close `i + 1`.
    for (i, &delta) in deltas.iter().enumerate().skip(period) {
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);

        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;

        match rsi_from_averages(avg_gain, avg_loss) {
            Some(rsi) => result[i + 1] = Some(rsi),
            None => break,
        }
    }

    result
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - If both averages are zero, RSI is 50.0 (no movement).
/// - If average loss is zero (only gains), RSI is 100.0.
/// - Returns `None` when the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn defined(series: &[Option<f64>]) -> Vec<f64> {
        series.iter().flatten().copied().collect()
    }

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(defined(&calculate_rsi(&[1.0, 2.0, 3.0], 0)).is_empty());
    }

    #[test]
    fn rsi_insufficient_data() {
        // Need period+1 closes (period deltas). 14 closes => 13 deltas < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.len(), 14);
        assert!(series.iter().all(Option::is_none));
    }

    #[test]
    fn rsi_first_value_at_period_index() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.len(), 20);
        assert!(series[13].is_none());
        assert!(series[14].is_some());
        assert!(series[14..].iter().all(Option::is_some));
    }

    #[test]
    fn rsi_all_gains() {
        // Strictly ascending prices => RSI should be 100.
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let series = defined(&calculate_rsi(&closes, 14));
        assert_eq!(series.len(), 16);
        for &v in &series {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses() {
        // Strictly descending prices => RSI should be 0.
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let series = defined(&calculate_rsi(&closes, 14));
        assert!(!series.is_empty());
        for &v in &series {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_flat_market() {
        // No price change at all => RSI = 50 (neutral).
        let closes = vec![100.0; 30];
        let series = defined(&calculate_rsi(&closes, 14));
        assert!(!series.is_empty());
        for &v in &series {
            assert!((v - 50.0).abs() < 1e-10, "expected 50.0, got {v}");
        }
    }

    #[test]
    fn rsi_range_check() {
        // Arbitrary data — RSI must always be in [0, 100].
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let series = defined(&calculate_rsi(&closes, 14));
        assert_eq!(series.len(), 4);
        for &v in &series {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }
}
