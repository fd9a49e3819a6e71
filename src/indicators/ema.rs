// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   alpha = 2 / (span + 1)
//   EMA_0 = close_0                               (seed)
//   EMA_t = close_t * alpha + EMA_{t-1} * (1 - alpha)
//
// The output series always has the same length as the input. A non-finite
// close produces a non-finite EMA at that index only; the recursion resumes
// from the last finite EMA value, matching how gap bars behave upstream.
// =============================================================================

use crate::error::ServiceError;

/// Compute the EMA series for the given `closes` slice and look-back `span`.
///
/// Single left-to-right pass, O(n) time. The first output element equals the
/// first input element.
///
/// # Errors
/// - `InsufficientData` when `closes` is empty or `span` is zero.
pub fn compute_ema(closes: &[f64], span: usize) -> Result<Vec<f64>, ServiceError> {
    if closes.is_empty() {
        return Err(ServiceError::InsufficientData(
            "cannot compute EMA over an empty series".into(),
        ));
    }
    if span == 0 {
        return Err(ServiceError::InsufficientData(
            "EMA span must be a positive integer".into(),
        ));
    }

    let alpha = 2.0 / (span as f64 + 1.0);

    let mut result = Vec::with_capacity(closes.len());
    // Last finite EMA value; None until the first finite close seeds it.
    let mut prev: Option<f64> = None;

    for &close in closes {
        if !close.is_finite() {
            result.push(f64::NAN);
            continue;
        }
        let ema = match prev {
            Some(p) => close * alpha + p * (1.0 - alpha),
            None => close,
        };
        result.push(ema);
        prev = Some(ema);
    }

    Ok(result)
}

/// Convenience: the most recent EMA value of `closes` for `span`.
pub fn latest_ema(closes: &[f64], span: usize) -> Result<f64, ServiceError> {
    let series = compute_ema(closes, span)?;
    // Non-empty input guarantees a non-empty series.
    Ok(*series.last().expect("EMA series of non-empty input is non-empty"))
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: build a simple ascending price series.
    fn ascending(n: usize) -> Vec<f64> {
        (1..=n).map(|i| i as f64).collect()
    }

    #[test]
    fn ema_empty_input_is_insufficient_data() {
        let err = compute_ema(&[], 5).unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientData(_)));
    }

    #[test]
    fn ema_span_zero_is_insufficient_data() {
        let err = compute_ema(&[1.0, 2.0, 3.0], 0).unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientData(_)));
    }

    #[test]
    fn ema_output_matches_input_length_and_seed() {
        let closes = ascending(20);
        let ema = compute_ema(&closes, 5).unwrap();
        assert_eq!(ema.len(), closes.len());
        assert!((ema[0] - closes[0]).abs() < 1e-12);
    }

    #[test]
    fn ema_constant_series_is_constant() {
        let closes = vec![42.5; 100];
        let ema = compute_ema(&closes, 55).unwrap();
        for v in ema {
            assert!((v - 42.5).abs() < 1e-12);
        }
    }

    #[test]
    fn ema_known_values() {
        // span=3 => alpha = 0.5; seed = 2.0
        // [2, 4, 8] => [2, 3, 5.5]
        let ema = compute_ema(&[2.0, 4.0, 8.0], 3).unwrap();
        assert!((ema[0] - 2.0).abs() < 1e-12);
        assert!((ema[1] - 3.0).abs() < 1e-12);
        assert!((ema[2] - 5.5).abs() < 1e-12);
    }

    #[test]
    fn ema_recurrence_holds() {
        let closes = ascending(50);
        let span = 10;
        let alpha = 2.0 / (span as f64 + 1.0);
        let ema = compute_ema(&closes, span).unwrap();
        for i in 1..closes.len() {
            let expected = closes[i] * alpha + ema[i - 1] * (1.0 - alpha);
            assert!((ema[i] - expected).abs() < 1e-10, "index {i}");
        }
    }

    #[test]
    fn shorter_span_converges_faster_on_rising_series() {
        let closes = ascending(200);
        let price = *closes.last().unwrap();
        let fast = latest_ema(&closes, 10).unwrap();
        let slow = latest_ema(&closes, 55).unwrap();
        assert!((fast - price).abs() <= (slow - price).abs());
    }

    #[test]
    fn ema_nan_input_is_absent_at_that_index_only() {
        let closes = vec![10.0, f64::NAN, 12.0, 13.0];
        let ema = compute_ema(&closes, 3).unwrap();
        assert_eq!(ema.len(), 4);
        assert!(ema[0].is_finite());
        assert!(ema[1].is_nan());
        assert!(ema[2].is_finite());
        assert!(ema[3].is_finite());
        // Recursion resumed from the last finite value (10.0).
        assert!((ema[2] - (12.0 * 0.5 + 10.0 * 0.5)).abs() < 1e-12);
    }

    #[test]
    fn ema_leading_nan_defers_seed() {
        let closes = vec![f64::NAN, 5.0, 6.0];
        let ema = compute_ema(&closes, 3).unwrap();
        assert!(ema[0].is_nan());
        assert!((ema[1] - 5.0).abs() < 1e-12);
    }
}
