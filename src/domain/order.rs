// ============================================================================
// Order Domain Model
// ============================================================================

use crate::numeric::Price;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of units to trade.
pub type Volume = u64;

// ============================================================================
// Value Objects
// ============================================================================

/// Admission number of an order. Assigned by the book, starting at 1;
/// a lower id means an earlier admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct OrderId(u64);

impl OrderId {
    /// Placeholder carried by orders that have not been admitted yet.
    pub const UNASSIGNED: Self = Self(0);

    pub const FIRST: Self = Self(1);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("buy"),
            Side::Sell => f.write_str("sell"),
        }
    }
}

/// What an order asks the book to do, with the data each kind needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderType {
    /// Trade at whatever the opposite side offers
    Market,
    /// Trade at `price` or better
    Limit { price: Price },
    /// Dormant until the last execution price crosses `trigger`
    /// (above it for buys, below it for sells). Once triggered it acts as a
    /// limit order at `limit`, or as a market order when `limit` is `None`.
    Stop {
        trigger: Price,
        limit: Option<Price>,
    },
    /// Disable the earlier order `target`
    Cancel { target: OrderId },
}

impl OrderType {
    pub fn name(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit { .. } => "limit",
            OrderType::Stop { .. } => "stop",
            OrderType::Cancel { .. } => "cancel",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Order Entity
// ============================================================================

/// A request to trade, plus its execution state.
///
/// The identity fields never change after admission. `remaining_volume`
/// only decreases, and the three status flags are never cleared once set.
/// Only the order book mutates an admitted order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    id: OrderId,
    side: Option<Side>,
    order_type: OrderType,
    volume: Volume,
    remaining: Volume,
    cancelled: bool,
    executed: bool,
    triggered: bool,
}

impl Order {
    fn with_type(side: Option<Side>, order_type: OrderType, volume: Volume) -> Self {
        Self {
            id: OrderId::UNASSIGNED,
            side,
            order_type,
            volume,
            remaining: volume,
            cancelled: false,
            executed: false,
            triggered: false,
        }
    }

    pub fn market(side: Side, volume: Volume) -> Self {
        Self::with_type(Some(side), OrderType::Market, volume)
    }

    pub fn limit(side: Side, volume: Volume, price: Price) -> Self {
        Self::with_type(Some(side), OrderType::Limit { price }, volume)
    }

    /// Stop order that becomes a market order when triggered.
    pub fn stop(side: Side, volume: Volume, trigger: Price) -> Self {
        Self::with_type(
            Some(side),
            OrderType::Stop {
                trigger,
                limit: None,
            },
            volume,
        )
    }

    /// Stop order that becomes a limit order at `limit` when triggered.
    pub fn stop_limit(side: Side, volume: Volume, trigger: Price, limit: Price) -> Self {
        Self::with_type(
            Some(side),
            OrderType::Stop {
                trigger,
                limit: Some(limit),
            },
            volume,
        )
    }

    pub fn cancel(target: OrderId) -> Self {
        Self::with_type(None, OrderType::Cancel { target }, 0)
    }

    // ========================================================================
    // Getters
    // ========================================================================

    pub fn id(&self) -> OrderId {
        self.id
    }

    /// `None` only for cancel orders.
    pub fn side(&self) -> Option<Side> {
        self.side
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn remaining_volume(&self) -> Volume {
        self.remaining
    }

    pub fn filled_volume(&self) -> Volume {
        self.volume - self.remaining
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    // ========================================================================
    // Derived properties
    // ========================================================================

    /// Execution boundary when the order trades: the limit of a limit order
    /// or of a stop-limit order. `None` for market-like orders.
    pub fn limit_price(&self) -> Option<Price> {
        match self.order_type {
            OrderType::Limit { price } => Some(price),
            OrderType::Stop { limit, .. } => limit,
            OrderType::Market | OrderType::Cancel { .. } => None,
        }
    }

    pub fn trigger_price(&self) -> Option<Price> {
        match self.order_type {
            OrderType::Stop { trigger, .. } => Some(trigger),
            _ => None,
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self.order_type, OrderType::Stop { .. })
    }

    pub fn is_cancel(&self) -> bool {
        matches!(self.order_type, OrderType::Cancel { .. })
    }

    /// Market orders and stop orders without a limit. These never rest.
    pub fn is_market_like(&self) -> bool {
        matches!(
            self.order_type,
            OrderType::Market | OrderType::Stop { limit: None, .. }
        )
    }

    /// Whether the order may take part in matching right now, as taker or maker.
    pub fn is_active(&self) -> bool {
        if self.cancelled || self.executed || self.is_cancel() {
            return false;
        }
        !self.is_stop() || self.triggered
    }

    /// Whether a trade at `price` crosses this stop order's trigger.
    /// Strict: a trade exactly at the trigger does not fire it.
    pub fn is_triggered_by(&self, price: Price) -> bool {
        match (self.order_type, self.side) {
            (OrderType::Stop { trigger, .. }, Some(Side::Buy)) => price > trigger,
            (OrderType::Stop { trigger, .. }, Some(Side::Sell)) => price < trigger,
            _ => false,
        }
    }

    // ========================================================================
    // Mutation (order book only)
    // ========================================================================

    pub(crate) fn assign_id(&mut self, id: OrderId) {
        self.id = id;
    }

    /// Deduct `volume` from the remaining volume, setting `executed` when it
    /// reaches zero. Returns false, leaving the order untouched, if `volume`
    /// is zero or larger than what remains.
    pub(crate) fn try_fill(&mut self, volume: Volume) -> bool {
        if volume == 0 || volume > self.remaining {
            return false;
        }
        self.remaining -= volume;
        if self.remaining == 0 {
            self.executed = true;
        }
        true
    }

    pub(crate) fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub(crate) fn mark_triggered(&mut self) {
        self.triggered = true;
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id.is_assigned() {
            write!(f, "[id {}] ", self.id)?;
        }
        if self.cancelled {
            f.write_str("[cancelled] ")?;
        }
        if self.executed {
            f.write_str("[executed] ")?;
        }
        if self.triggered {
            f.write_str("[triggered] ")?;
        }

        let side = self.side.map_or("unknown side", |side| match side {
            Side::Buy => "buy",
            Side::Sell => "sell",
        });
        let bound = match self.side {
            Some(Side::Buy) => "<=",
            Some(Side::Sell) => ">=",
            None => "?!?",
        };

        match self.order_type {
            OrderType::Market => write!(
                f,
                "market order to {} {} units at market price, with {} remaining",
                side, self.volume, self.remaining
            ),
            OrderType::Limit { price } => write!(
                f,
                "limit order to {} {} units {} ${}, with {} remaining",
                side, self.volume, bound, price, self.remaining
            ),
            OrderType::Stop { trigger, limit } => {
                let direction = match self.side {
                    Some(Side::Buy) => ">",
                    Some(Side::Sell) => "<",
                    None => "?!?",
                };
                write!(
                    f,
                    "stop order to {} {} units if price goes {} {}",
                    side, self.volume, direction, trigger
                )?;
                if let Some(limit) = limit {
                    write!(f, ", then {} ${}", bound, limit)?;
                }
                write!(f, ", with {} remaining", self.remaining)
            },
            OrderType::Cancel { target } => {
                write!(f, "cancel order that disables #{}", target)
            },
        }
    }
}
