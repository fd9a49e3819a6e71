// =============================================================================
// Indicator Engine
// =============================================================================
//
// Pure, side-effect-free computations over already-fetched closing prices.
// Every public function returns `Result` so callers are forced to handle
// insufficient-data and numerical-edge-case scenarios.

pub mod deviation;
pub mod ema;
