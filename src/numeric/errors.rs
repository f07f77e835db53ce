// ============================================================================
// Numeric Errors
// Error types for fixed-point arithmetic operations
// ============================================================================

use thiserror::Error;

/// Errors that can occur during fixed-point arithmetic or conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum NumericError {
    #[error("arithmetic overflow: result exceeded maximum value")]
    Overflow,
    #[error("arithmetic underflow: result below minimum value")]
    Underflow,
    /// More fractional digits than the fixed scale can hold
    #[error("precision loss: conversion would lose significant digits")]
    PrecisionLoss,
    #[error("invalid input: could not parse value")]
    InvalidInput,
}

/// Result type alias for numeric operations
pub type NumericResult<T> = Result<T, NumericError>;
