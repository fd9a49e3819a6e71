// =============================================================================
// Recommendation Policy — fixed-threshold signal classification
// =============================================================================
//
// Two independent, stateless rules:
//
//   1. Range position: where the current price sits inside its 52-week
//      low-high range. ratio < 0.3 => Buy, ratio > 0.7 => Sell, else Hold.
//   2. EMA deviation: fractional distance of the latest close from EMA-55.
//      deviation < 0.02 => Buy, else Wait.
//
// The EMA rule is asymmetric: a large negative deviation (price far below
// the EMA) classifies as Buy just like a small one, and anything at or above
// +2% is Wait.
// =============================================================================

use serde::Serialize;

use crate::error::ServiceError;

/// EMA span used by the deviation rule. Fixed, not configurable.
pub const EMA_SPAN: usize = 55;

/// Range-position thresholds.
pub const RANGE_BUY_BELOW: f64 = 0.3;
pub const RANGE_SELL_ABOVE: f64 = 0.7;

/// EMA-deviation Buy threshold (fractional, i.e. 0.02 == 2%).
pub const DEVIATION_BUY_BELOW: f64 = 0.02;

// =============================================================================
// Signal
// =============================================================================

/// Classification label produced by the policy rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
    Wait,
}

impl Signal {
    /// The user-facing label string carried on the wire.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Buy => "Buy - undervalued",
            Self::Sell => "Sell - overpriced",
            Self::Hold => "Hold",
            Self::Wait => "Consider waiting - overpriced",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Range-position rule
// =============================================================================

/// Result of the range-position rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeAssessment {
    /// Normalised position of price inside [low, high], rounded to 2 dp.
    pub ratio: f64,
    pub signal: Signal,
}

/// Classify `price` by its position inside the `[low, high]` range.
///
/// # Errors
/// - `InsufficientData` when any input is non-finite or the range is
///   degenerate (`high <= low`).
pub fn classify_by_range(price: f64, low: f64, high: f64) -> Result<RangeAssessment, ServiceError> {
    if !price.is_finite() || !low.is_finite() || !high.is_finite() {
        return Err(ServiceError::InsufficientData(
            "Insufficient data for recommendation".into(),
        ));
    }
    if high <= low {
        return Err(ServiceError::InsufficientData(
            "Insufficient data for recommendation".into(),
        ));
    }

    let ratio = (price - low) / (high - low);
    let signal = if ratio < RANGE_BUY_BELOW {
        Signal::Buy
    } else if ratio > RANGE_SELL_ABOVE {
        Signal::Sell
    } else {
        Signal::Hold
    };

    Ok(RangeAssessment {
        ratio: round2(ratio),
        signal,
    })
}

// =============================================================================
// EMA-deviation rule
// =============================================================================

/// Classify a fractional EMA deviation. Below +2% is Buy; everything else,
/// including exactly +2%, is Wait.
pub fn classify_by_ema_deviation(deviation: f64) -> Signal {
    if deviation < DEVIATION_BUY_BELOW {
        Signal::Buy
    } else {
        Signal::Wait
    }
}

// =============================================================================
// Presentation rounding
// =============================================================================

/// Round to 2 decimal places. Part of the observable contract: ratios and
/// percentages are reported rounded on the wire.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
