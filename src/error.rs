// ============================================================================
// Engine Errors
// Failures surfaced by the order book, kept apart from "no liquidity"
// ============================================================================

use thiserror::Error;

/// Errors returned by [`crate::engine::OrderBook::add`].
///
/// An empty match list is never an error. Only `InvalidOrder` leaves the
/// book usable; the two fault variants halt it until
/// [`crate::engine::OrderBook::reset`] is called.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The order does not fit the book configuration. Nothing was mutated.
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// A matching rule was broken. This is a logic fault, never a market outcome.
    #[error("matching invariant violated: {0}")]
    InvariantViolation(String),

    /// A price index is inconsistent with the order records.
    #[error("price index fault: {0}")]
    StructuralFault(String),

    /// A previous fault stopped the book.
    #[error("order book halted after fault: {0}")]
    Halted(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The sequencer worker is gone and can take no more orders.
    #[error("order sequencer is closed")]
    SequencerClosed,
}

impl EngineError {
    /// True for the variants that must halt the book.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            EngineError::InvariantViolation(_) | EngineError::StructuralFault(_)
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
