// =============================================================================
// Market Data Model
// =============================================================================
//
// Plain data carried between the provider client and the signal layer. Both
// types are fetched fresh per request and never cached or persisted.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

// =============================================================================
// PriceBar
// =============================================================================

/// A single OHLC bar. Sequences are chronological ascending, immutable once
/// retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }
}

/// Extract the closing prices of a bar sequence, preserving order.
pub fn closing_prices(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

// =============================================================================
// InstrumentSnapshot
// =============================================================================

/// Flat attribute mapping describing an instrument, as returned by the data
/// provider. No fixed schema is guaranteed; key presence is always optional
/// and a JSON `null` counts as absent.
#[derive(Debug, Clone, Default)]
pub struct InstrumentSnapshot(serde_json::Map<String, serde_json::Value>);

impl InstrumentSnapshot {
    pub fn new(attributes: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(attributes)
    }

    /// All attribute names, in provider order.
    pub fn field_names(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    /// Look up an attribute. `null` values are treated as absent.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// Look up a numeric attribute.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(|v| v.as_f64())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn snapshot() -> InstrumentSnapshot {
        let obj = json!({
            "regularMarketPrice": 187.3,
            "fiftyTwoWeekLow": 124.17,
            "fiftyTwoWeekHigh": 199.62,
            "shortName": "Apple Inc.",
            "trailingPE": null,
        });
        match obj {
            serde_json::Value::Object(map) => InstrumentSnapshot::new(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn field_names_lists_all_keys() {
        let names = snapshot().field_names();
        assert_eq!(names.len(), 5);
        assert!(names.contains(&"regularMarketPrice".to_string()));
        assert!(names.contains(&"trailingPE".to_string()));
    }

    #[test]
    fn null_field_is_absent() {
        let snap = snapshot();
        assert!(snap.field("trailingPE").is_none());
        assert!(snap.field("missingEntirely").is_none());
    }

    #[test]
    fn number_extracts_floats() {
        let snap = snapshot();
        assert!((snap.number("regularMarketPrice").unwrap() - 187.3).abs() < 1e-12);
        assert!(snap.number("shortName").is_none());
    }

    #[test]
    fn closing_prices_preserve_order() {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap();
        let bars = vec![
            PriceBar::new(t, 1.0, 2.0, 0.5, 1.5),
            PriceBar::new(t + chrono::Duration::hours(4), 1.5, 2.5, 1.0, 2.0),
        ];
        assert_eq!(closing_prices(&bars), vec![1.5, 2.0]);
    }
}
