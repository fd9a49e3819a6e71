// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// Route map:
//   GET /health                             — liveness + uptime
//   GET /stock/:symbol/fields               — snapshot attribute names
//   GET /stock/:symbol/field/:field         — single attribute value
//   GET /stock/:symbol/recommendation       — 52-week range position signal
//   GET /stock/:symbol/ema-recommendation   — EMA-55 deviation signal
//   GET /stock/:symbol/history              — 1y of 4h bars with EMA-55
//
// CORS admits a single configured origin (the dashboard). Requests are traced
// via tower-http's TraceLayer under the `tower_http::trace` target.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::app_state::AppState;
use crate::error::ServiceError;
use crate::indicators::deviation::percent_deviation;
use crate::indicators::ema::compute_ema;
use crate::market_data::closing_prices;
use crate::recommendation::{classify_by_ema_deviation, classify_by_range, round2, EMA_SPAN};

/// Lookback used by the EMA deviation signal.
const SIGNAL_RANGE: &str = "7d";
/// Lookback used by the history endpoint.
const HISTORY_RANGE: &str = "1y";
/// Bar interval shared by both history fetches.
const BAR_INTERVAL: &str = "4h";

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST router with CORS + trace middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let allow_origin = match state.config.allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            warn!(
                origin = %state.config.allowed_origin,
                "allowed_origin is not a valid header value — falling back to permissive CORS"
            );
            AllowOrigin::from(Any)
        }
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/stock/:symbol/fields", get(fields))
        .route("/stock/:symbol/field/:field", get(field_value))
        .route("/stock/:symbol/recommendation", get(range_recommendation))
        .route("/stock/:symbol/ema-recommendation", get(ema_recommendation))
        .route("/stock/:symbol/history", get(history))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Instrument snapshot endpoints
// =============================================================================

async fn fields(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ServiceError> {
    let snapshot = state
        .market
        .get_quote(&symbol)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Stock data not available".into()))?;

    Ok(Json(snapshot.field_names()))
}

async fn field_value(
    Path((symbol, field)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let snapshot = state
        .market
        .get_quote(&symbol)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Stock data not available".into()))?;

    let value = snapshot
        .field(&field)
        .cloned()
        .ok_or_else(|| ServiceError::NotFound("Field not found".into()))?;

    let mut body = serde_json::Map::new();
    body.insert(field, value);
    Ok(Json(serde_json::Value::Object(body)))
}

// =============================================================================
// Range-position recommendation
// =============================================================================

#[derive(Debug, Serialize)]
struct RangeRecommendationResponse {
    symbol: String,
    price: f64,
    #[serde(rename = "fiftyTwoWeekLow")]
    fifty_two_week_low: f64,
    #[serde(rename = "fiftyTwoWeekHigh")]
    fifty_two_week_high: f64,
    #[serde(rename = "positionRatio")]
    position_ratio: f64,
    recommendation: &'static str,
}

async fn range_recommendation(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RangeRecommendationResponse>, ServiceError> {
    let snapshot = state
        .market
        .get_quote(&symbol)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Stock data not available".into()))?;

    let price = snapshot
        .number("regularMarketPrice")
        .ok_or_else(|| ServiceError::NotFound("Stock data not available".into()))?;

    let low = snapshot.number("fiftyTwoWeekLow").ok_or_else(|| {
        ServiceError::InsufficientData("Insufficient data for recommendation".into())
    })?;
    let high = snapshot.number("fiftyTwoWeekHigh").ok_or_else(|| {
        ServiceError::InsufficientData("Insufficient data for recommendation".into())
    })?;

    let assessment = classify_by_range(price, low, high)?;

    Ok(Json(RangeRecommendationResponse {
        symbol,
        price,
        fifty_two_week_low: low,
        fifty_two_week_high: high,
        position_ratio: assessment.ratio,
        recommendation: assessment.signal.label(),
    }))
}

// =============================================================================
// EMA-deviation recommendation
// =============================================================================

#[derive(Debug, Serialize)]
struct EmaRecommendationResponse {
    symbol: String,
    #[serde(rename = "currentPrice")]
    current_price: f64,
    #[serde(rename = "EMA55")]
    ema_55: f64,
    /// Deviation as a percentage, rounded to 2 dp.
    #[serde(rename = "percentDifference")]
    percent_difference: f64,
    recommendation: &'static str,
}

async fn ema_recommendation(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<EmaRecommendationResponse>, ServiceError> {
    let bars = state
        .market
        .get_history(&symbol, SIGNAL_RANGE, BAR_INTERVAL)
        .await?;

    if bars.is_empty() {
        return Err(ServiceError::NotFound("No data available".into()));
    }

    let closes = closing_prices(&bars);
    let ema = compute_ema(&closes, EMA_SPAN)?;

    // Non-empty bars guarantee non-empty series.
    let current_price = *closes.last().expect("closes is non-empty");
    let ema_55 = *ema.last().expect("EMA series matches input length");

    let deviation = percent_deviation(current_price, ema_55)?;
    let signal = classify_by_ema_deviation(deviation);

    Ok(Json(EmaRecommendationResponse {
        symbol,
        current_price,
        ema_55,
        percent_difference: round2(deviation * 100.0),
        recommendation: signal.label(),
    }))
}

// =============================================================================
// History
// =============================================================================

#[derive(Debug, Serialize)]
struct HistoryPoint {
    datetime: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    /// Absent (null) where the EMA value is undefined for the bar.
    #[serde(rename = "EMA55")]
    ema_55: Option<f64>,
}

async fn history(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<HistoryPoint>>, ServiceError> {
    let bars = state
        .market
        .get_history(&symbol, HISTORY_RANGE, BAR_INTERVAL)
        .await?;

    if bars.is_empty() {
        return Err(ServiceError::NotFound("No data available".into()));
    }

    let closes = closing_prices(&bars);
    let ema = compute_ema(&closes, EMA_SPAN)?;

    let points = bars
        .iter()
        .zip(ema.iter())
        .map(|(bar, &ema_value)| HistoryPoint {
            datetime: bar.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            open: round2(bar.open),
            high: round2(bar.high),
            low: round2(bar.low),
            close: round2(bar.close),
            ema_55: ema_value.is_finite().then(|| round2(ema_value)),
        })
        .collect();

    Ok(Json(points))
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_response_uses_camel_case_keys() {
        let resp = RangeRecommendationResponse {
            symbol: "AAPL".into(),
            price: 187.3,
            fifty_two_week_low: 124.17,
            fifty_two_week_high: 199.62,
            position_ratio: 0.84,
            recommendation: "Sell - overpriced",
        };
        let v = serde_json::to_value(&resp).unwrap();
        assert!(v.get("fiftyTwoWeekLow").is_some());
        assert!(v.get("fiftyTwoWeekHigh").is_some());
        assert!(v.get("positionRatio").is_some());
        assert_eq!(v["recommendation"], "Sell - overpriced");
    }

    #[test]
    fn ema_response_uses_camel_case_keys() {
        let resp = EmaRecommendationResponse {
            symbol: "AAPL".into(),
            current_price: 187.3,
            ema_55: 180.0,
            percent_difference: 4.06,
            recommendation: "Consider waiting - overpriced",
        };
        let v = serde_json::to_value(&resp).unwrap();
        assert!(v.get("currentPrice").is_some());
        assert!(v.get("EMA55").is_some());
        assert!(v.get("percentDifference").is_some());
    }

    #[test]
    fn history_point_serialises_absent_ema_as_null() {
        let point = HistoryPoint {
            datetime: "2024-01-02 09:30".into(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            ema_55: None,
        };
        let v = serde_json::to_value(&point).unwrap();
        assert!(v["EMA55"].is_null());
        assert_eq!(v["datetime"], "2024-01-02 09:30");
    }
}
