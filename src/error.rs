// =============================================================================
// Service Error — typed failures shared by the core and the REST layer
// =============================================================================
//
// The core computations never catch or suppress errors; they surface typed
// variants and the handler layer decides the user-facing HTTP status. All
// variants are deterministic and non-retryable except `Provider`, which wraps
// an upstream fetch failure.
// =============================================================================

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified error type for the signal service.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// A required value is missing, a series is empty, or a range is
    /// degenerate (high == low). Data-shape problem, not a transient fault.
    InsufficientData(String),
    /// The reference value of a deviation calculation is zero.
    DivisionByZero(String),
    /// The requested symbol or attribute does not exist upstream.
    NotFound(String),
    /// The data provider request failed (network, timeout, bad payload).
    Provider(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientData(msg) => write!(f, "insufficient data: {msg}"),
            Self::DivisionByZero(msg) => write!(f, "division by zero: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Provider(msg) => write!(f, "provider error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::InsufficientData(msg) => (StatusCode::NOT_FOUND, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::DivisionByZero(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            Self::Provider(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(e: anyhow::Error) -> Self {
        Self::Provider(format!("{e:#}"))
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn insufficient_data_maps_to_404() {
        let resp = ServiceError::InsufficientData("empty series".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn division_by_zero_maps_to_500() {
        let resp = ServiceError::DivisionByZero("reference is zero".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn provider_maps_to_502() {
        let resp = ServiceError::Provider("connection refused".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn display_includes_detail() {
        let e = ServiceError::NotFound("Field not found".into());
        assert_eq!(e.to_string(), "not found: Field not found");
    }
}
