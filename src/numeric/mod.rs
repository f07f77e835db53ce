// ============================================================================
// Numeric Module
// Fixed-point arithmetic for prices
// ============================================================================
//
// Prices are integer counts of minor units (cents), never floats, so that
// repeated matching cannot drift. Volumes are whole units and live in the
// domain module as plain `u64`.

mod errors;
mod fixed_decimal;

pub use errors::{NumericError, NumericResult};
pub use fixed_decimal::{FixedDecimal, Price};
