// =============================================================================
// Percent Deviation
// =============================================================================
//
// Relative distance of a current value from a reference value:
//   deviation = (current - reference) / reference
//
// Used to measure how far the latest close sits above or below its EMA.

use crate::error::ServiceError;

/// Fractional deviation of `current` from `reference`.
///
/// # Errors
/// - `DivisionByZero` when `reference` is zero.
pub fn percent_deviation(current: f64, reference: f64) -> Result<f64, ServiceError> {
    if reference == 0.0 {
        return Err(ServiceError::DivisionByZero(
            "deviation reference value is zero".into(),
        ));
    }
    Ok((current - reference) / reference)
}
