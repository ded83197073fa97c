// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================

/// Rolling arithmetic mean of the last `period` closes.
///
/// Output is aligned with `closes`; the first `period - 1` slots are `None`.
/// A window containing a non-finite close yields `None` for that slot only.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return result;
    }

    for (i, window) in closes.windows(period).enumerate() {
        let mean = window.iter().sum::<f64>() / period as f64;
        if mean.is_finite() {
            result[i + period - 1] = Some(mean);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_known_values() {
        let closes = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let sma = calculate_sma(&closes, 3);
        assert_eq!(sma, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn sma_insufficient_data() {
        assert_eq!(calculate_sma(&[1.0, 2.0], 20), vec![None, None]);
    }

    #[test]
    fn sma_period_zero() {
        assert_eq!(calculate_sma(&[1.0], 0), vec![None]);
    }

    #[test]
    fn sma_nan_only_poisons_its_windows() {
        let closes = vec![1.0, f64::NAN, 3.0, 4.0, 5.0];
        let sma = calculate_sma(&closes, 2);
        assert_eq!(sma, vec![None, None, None, Some(3.5), Some(4.5)]);
    }
}
