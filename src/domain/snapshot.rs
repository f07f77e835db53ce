// ============================================================================
// Order Book Snapshot
// ============================================================================

use super::Volume;
use crate::numeric::Price;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable view of the book's aggregated price levels
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookSnapshot {
    pub instrument: String,
    /// Bid levels (price, remaining volume), highest first
    pub bids: Vec<(Price, Volume)>,
    /// Ask levels (price, remaining volume), lowest first
    pub asks: Vec<(Price, Volume)>,
    /// Current spread (ask - bid)
    pub spread: Option<Price>,
    /// Price of the most recent match
    pub last_price: Option<Price>,
    /// Stop orders waiting for their trigger
    pub pending_stops: usize,
}

impl OrderBookSnapshot {
    pub fn with_depth(
        instrument: String,
        bids: Vec<(Price, Volume)>,
        asks: Vec<(Price, Volume)>,
        last_price: Option<Price>,
        pending_stops: usize,
    ) -> Self {
        let spread = match (bids.first(), asks.first()) {
            (Some((bid, _)), Some((ask, _))) => ask.checked_sub(*bid).ok(),
            _ => None,
        };

        Self {
            instrument,
            bids,
            asks,
            spread,
            last_price,
            pending_stops,
        }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|(price, _)| *price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|(price, _)| *price)
    }

    /// Saturates at `u64::MAX`, like the level totals.
    pub fn total_bid_volume(&self) -> Volume {
        total_volume(&self.bids)
    }

    pub fn total_ask_volume(&self) -> Volume {
        total_volume(&self.asks)
    }
}

fn total_volume(levels: &[(Price, Volume)]) -> Volume {
    levels
        .iter()
        .fold(0, |total: Volume, (_, volume)| total.saturating_add(*volume))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_book_snapshot() {
        let snapshot = OrderBookSnapshot::with_depth(
            "BTC-USD".to_string(),
            vec![(Price::from_integer(50000).unwrap(), 1)],
            vec![
                (Price::from_integer(50100).unwrap(), 2),
                (Price::from_integer(50200).unwrap(), 3),
            ],
            None,
            0,
        );

        assert_eq!(snapshot.best_bid(), Some(Price::from_integer(50000).unwrap()));
        assert_eq!(snapshot.best_ask(), Some(Price::from_integer(50100).unwrap()));
        assert_eq!(snapshot.spread, Some(Price::from_integer(100).unwrap()));
        assert_eq!(snapshot.total_ask_volume(), 5);
        assert_eq!(snapshot.total_bid_volume(), 1);
    }

    #[test]
    fn test_one_sided_book_has_no_spread() {
        let snapshot = OrderBookSnapshot::with_depth(
            "X".to_string(),
            vec![],
            vec![(Price::ONE, 1)],
            None,
            0,
        );
        assert_eq!(snapshot.spread, None);
        assert_eq!(snapshot.best_bid(), None);
    }

    #[test]
    fn test_total_volume_saturates() {
        let snapshot = OrderBookSnapshot::with_depth(
            "X".to_string(),
            vec![],
            vec![(Price::ONE, u64::MAX), (Price::from_raw(101), 7)],
            None,
            0,
        );
        assert_eq!(snapshot.total_ask_volume(), u64::MAX);
        assert_eq!(snapshot.total_bid_volume(), 0);
    }
}
