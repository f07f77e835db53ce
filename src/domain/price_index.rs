// ============================================================================
// Price Index
// Ordered index of open orders keyed by (price, admission id)
// ============================================================================

use crossbeam_skiplist::SkipSet;
use std::fmt;
use std::ops::Bound;

use super::OrderId;
use crate::error::{EngineError, EngineResult};
use crate::numeric::Price;

/// Which collection of the book an index holds. Used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Bids,
    Asks,
    PendingStops,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Bids => f.write_str("bids"),
            IndexKind::Asks => f.write_str("asks"),
            IndexKind::PendingStops => f.write_str("pending stops"),
        }
    }
}

type IndexKey = (Price, OrderId);

/// Skip list of `(price, id)` keys.
///
/// Keys sort by price, then by id, so walking one price level visits the
/// oldest order first. Insert, removal and range lookups are O(log n)
/// whatever the insertion order. The index only stores ids; order state
/// lives in the book.
pub struct PriceIndex {
    kind: IndexKind,
    entries: SkipSet<IndexKey>,
}

impl PriceIndex {
    pub fn new(kind: IndexKind) -> Self {
        Self {
            kind,
            entries: SkipSet::new(),
        }
    }

    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    /// Add an order under `price`. Never rejects.
    pub fn insert(&self, price: Price, id: OrderId) {
        self.entries.insert((price, id));
    }

    /// Remove an order. Removing an entry that is not present means the
    /// index and the order records disagree, which is reported as a fault.
    pub fn delete(&self, price: Price, id: OrderId) -> EngineResult<()> {
        match self.entries.remove(&(price, id)) {
            Some(_) => Ok(()),
            None => Err(EngineError::StructuralFault(format!(
                "order {} at {} is not in the {} index",
                id, price, self.kind
            ))),
        }
    }

    pub fn contains(&self, price: Price, id: OrderId) -> bool {
        self.entries.contains(&(price, id))
    }

    /// All entries satisfying the threshold, in ascending key order.
    ///
    /// With `want_highest` the entries priced at or above `threshold` are
    /// returned, otherwise those at or below it. A `None` threshold (market
    /// takers) returns every entry.
    pub fn candidates_at_or_better(
        &self,
        threshold: Option<Price>,
        want_highest: bool,
    ) -> Vec<IndexKey> {
        let bounds = match threshold {
            None => (Bound::Unbounded, Bound::Unbounded),
            Some(price) if want_highest => (
                Bound::Included((price, OrderId::UNASSIGNED)),
                Bound::Unbounded,
            ),
            Some(price) => (
                Bound::Unbounded,
                Bound::Included((price, OrderId::new(u64::MAX))),
            ),
        };
        self.collect(bounds)
    }

    /// Entries priced strictly below `price`, ascending.
    pub fn strictly_below(&self, price: Price) -> Vec<IndexKey> {
        self.collect((
            Bound::Unbounded,
            Bound::Excluded((price, OrderId::UNASSIGNED)),
        ))
    }

    /// Entries priced strictly above `price`, ascending.
    pub fn strictly_above(&self, price: Price) -> Vec<IndexKey> {
        self.collect((
            Bound::Excluded((price, OrderId::new(u64::MAX))),
            Bound::Unbounded,
        ))
    }

    /// Walk the entries starting from the highest or the lowest price.
    /// Within a price the walk direction follows the price direction.
    pub fn iter_from(&self, highest_first: bool) -> Box<dyn Iterator<Item = IndexKey> + '_> {
        if highest_first {
            Box::new(self.entries.iter().rev().map(|entry| *entry.value()))
        } else {
            Box::new(self.entries.iter().map(|entry| *entry.value()))
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    fn collect(&self, bounds: (Bound<IndexKey>, Bound<IndexKey>)) -> Vec<IndexKey> {
        let found: Vec<IndexKey> = self
            .entries
            .range(bounds)
            .map(|entry| *entry.value())
            .collect();
        tracing::trace!(index = %self.kind, candidates = found.len(), "price index scan");
        found
    }
}

impl fmt::Debug for PriceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceIndex")
            .field("kind", &self.kind)
            .field("len", &self.entries.len())
            .finish()
    }
}
