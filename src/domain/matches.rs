// ============================================================================
// Match Domain Model
// ============================================================================

use crate::numeric::{NumericResult, Price};
use std::fmt;

use super::{OrderId, Volume};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An execution between two orders.
///
/// Orders are referenced by id, never by value: the book owns the order
/// records and applies the volume deduction itself. A `Match` is only the
/// record of what happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Match {
    /// The order being matched (incoming, or freshly triggered)
    pub taker: OrderId,

    /// The resting order it matched against
    pub maker: OrderId,

    pub volume: Volume,

    /// Execution price, always the maker's limit
    pub price: Price,
}

/// Matches in the order they were applied.
pub type Matches = Vec<Match>;

impl Match {
    pub fn new(taker: OrderId, maker: OrderId, volume: Volume, price: Price) -> Self {
        Self {
            taker,
            maker,
            volume,
            price,
        }
    }

    /// Price × volume. Fails only on overflow.
    pub fn notional_value(&self) -> NumericResult<Price> {
        self.price.checked_mul_int(self.volume)
    }
}

/// The stable output line: `match <takerId> <makerId> <volume> <price>`.
impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "match {} {} {} {}",
            self.taker, self.maker, self.volume, self.price
        )
    }
}
