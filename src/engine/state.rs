// ============================================================================
// Book State
// Order arena and the three price indexes
// ============================================================================

use std::collections::BTreeSet;

use crate::domain::{IndexKind, Match, Order, OrderId, PriceIndex, Side};
use crate::error::{EngineError, EngineResult};
use crate::numeric::Price;

/// Everything an order book mutates while processing orders.
///
/// Orders live in an arena indexed by id (`id - 1`) and are never removed;
/// indexes and matches refer to them by id only.
pub(crate) struct BookState {
    pub(crate) orders: Vec<Order>,
    pub(crate) bids: PriceIndex,
    pub(crate) asks: PriceIndex,
    pub(crate) stops: PriceIndex,
    pub(crate) next_id: OrderId,
    pub(crate) cancelled: BTreeSet<OrderId>,
    pub(crate) last_price: Option<Price>,
}

impl BookState {
    pub(crate) fn new() -> Self {
        Self {
            orders: Vec::new(),
            bids: PriceIndex::new(IndexKind::Bids),
            asks: PriceIndex::new(IndexKind::Asks),
            stops: PriceIndex::new(IndexKind::PendingStops),
            next_id: OrderId::FIRST,
            cancelled: BTreeSet::new(),
            last_price: None,
        }
    }

    /// Give `order` the next id and store it.
    pub(crate) fn store(&mut self, mut order: Order) -> OrderId {
        let id = self.next_id;
        self.next_id = id.next();
        order.assign_id(id);
        self.orders.push(order);
        id
    }

    fn slot(id: OrderId) -> Option<usize> {
        id.value().checked_sub(1).map(|slot| slot as usize)
    }

    pub(crate) fn get(&self, id: OrderId) -> Option<&Order> {
        Self::slot(id).and_then(|slot| self.orders.get(slot))
    }

    /// Lookup for ids the book itself handed out. A miss is a fault.
    pub(crate) fn order(&self, id: OrderId) -> EngineResult<&Order> {
        self.get(id).ok_or_else(|| missing(id))
    }

    pub(crate) fn order_mut(&mut self, id: OrderId) -> EngineResult<&mut Order> {
        Self::slot(id)
            .and_then(|slot| self.orders.get_mut(slot))
            .ok_or_else(|| missing(id))
    }

    pub(crate) fn index(&self, side: Side) -> &PriceIndex {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Apply a match: deduct its volume from both orders and drop any order
    /// that became executed from its price index.
    ///
    /// The match is checked against both orders first, so a rejected match
    /// leaves them untouched.
    pub(crate) fn apply(&mut self, matched: &Match) -> EngineResult<()> {
        let taker = self.order(matched.taker)?;
        let maker = self.order(matched.maker)?;

        if matched.volume == 0 {
            return Err(EngineError::InvariantViolation(format!(
                "zero-volume match between {} and {}",
                matched.taker, matched.maker
            )));
        }
        if matched.volume > taker.remaining_volume() || matched.volume > maker.remaining_volume() {
            return Err(EngineError::InvariantViolation(format!(
                "match volume {} exceeds remaining volume of {} ({}) or {} ({})",
                matched.volume,
                taker.id(),
                taker.remaining_volume(),
                maker.id(),
                maker.remaining_volume()
            )));
        }

        let (Some(taker_side), Some(maker_side)) = (taker.side(), maker.side()) else {
            return Err(EngineError::InvariantViolation(
                "matched order has no side".to_string(),
            ));
        };
        if taker_side == maker_side {
            return Err(EngineError::InvariantViolation(format!(
                "orders {} and {} are both on the {} side",
                taker.id(),
                maker.id(),
                taker_side
            )));
        }
        if let Some(limit) = taker.limit_price() {
            let within = match taker_side {
                Side::Buy => matched.price <= limit,
                Side::Sell => matched.price >= limit,
            };
            if !within {
                return Err(EngineError::InvariantViolation(format!(
                    "order {} limited to {} matched at {}",
                    taker.id(),
                    limit,
                    matched.price
                )));
            }
        }

        let maker_price = maker.limit_price();
        let taker_resting = taker.limit_price();

        self.fill(matched.taker, matched.volume)?;
        self.fill(matched.maker, matched.volume)?;
        self.last_price = Some(matched.price);

        if self.order(matched.maker)?.is_executed() {
            let price = maker_price.ok_or_else(|| {
                EngineError::StructuralFault(format!(
                    "resting order {} has no limit price",
                    matched.maker
                ))
            })?;
            self.index(maker_side).delete(price, matched.maker)?;
        }
        if self.order(matched.taker)?.is_executed() {
            if let Some(price) = taker_resting {
                self.index(taker_side).delete(price, matched.taker)?;
            }
        }

        Ok(())
    }

    /// Deduct `volume` from one order. A fill the order cannot take is a
    /// logic fault, never a silent no-op.
    fn fill(&mut self, id: OrderId, volume: u64) -> EngineResult<()> {
        if self.order_mut(id)?.try_fill(volume) {
            Ok(())
        } else {
            Err(EngineError::InvariantViolation(format!(
                "order {} could not absorb a fill of {}",
                id, volume
            )))
        }
    }

    /// Total remaining volume of active orders on one side, by price level,
    /// best level first. A level total saturates at `u64::MAX`.
    pub(crate) fn depth(&self, side: Side, levels: usize) -> EngineResult<Vec<(Price, u64)>> {
        let mut depth: Vec<(Price, u64)> = Vec::new();
        for (price, id) in self.index(side).iter_from(side == Side::Buy) {
            let remaining = self.order(id)?.remaining_volume();
            if let Some((level, volume)) = depth.last_mut() {
                if *level == price {
                    *volume = volume.saturating_add(remaining);
                    continue;
                }
            }
            if depth.len() == levels {
                break;
            }
            depth.push((price, remaining));
        }
        Ok(depth)
    }
}

fn missing(id: OrderId) -> EngineError {
    EngineError::StructuralFault(format!("order {} is not in the book", id))
}
