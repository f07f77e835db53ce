// ============================================================================
// Event Handler Interface
// Audit stream of everything the order book does
// ============================================================================

use crate::domain::{Match, OrderId, Side, Volume};
use crate::numeric::Price;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Why an order stopped being eligible for matching without executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CancelReason {
    /// A cancel order targeted it
    Requested,
    /// Market-like remainder found no more liquidity and was discarded
    UnfilledMarket,
}

/// Events emitted by the order book
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderEvent {
    /// Order admitted and given its id
    OrderAccepted {
        order_id: OrderId,
        timestamp: DateTime<Utc>,
    },

    /// Order refused before admission; the book is unchanged
    OrderRejected {
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Order left resting in a price index
    OrderRested {
        order_id: OrderId,
        side: Side,
        price: Price,
        remaining: Volume,
        timestamp: DateTime<Utc>,
    },

    /// Stop order parked until its trigger is crossed
    StopPending {
        order_id: OrderId,
        trigger: Price,
        timestamp: DateTime<Utc>,
    },

    /// Match applied to both orders
    OrderMatched {
        matched: Match,
        timestamp: DateTime<Utc>,
    },

    /// Stop order promoted into matching by a trade at `price`
    StopTriggered {
        order_id: OrderId,
        price: Price,
        timestamp: DateTime<Utc>,
    },

    OrderCancelled {
        order_id: OrderId,
        reason: CancelReason,
        timestamp: DateTime<Utc>,
    },

    /// Cancel order whose target was unknown, executed, or already cancelled
    CancelIgnored {
        order_id: OrderId,
        target: OrderId,
        timestamp: DateTime<Utc>,
    },

    /// A fault stopped the book
    BookHalted {
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

/// Event handler trait for processing order book events.
/// Implementations can handle logging, auditing, market data, etc.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: OrderEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<OrderEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// Discards every event
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: OrderEvent) {}
}

/// Forwards events to `tracing`
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: OrderEvent) {
        match &event {
            OrderEvent::BookHalted { reason, .. } => {
                tracing::error!(%reason, "order book halted");
            },
            OrderEvent::OrderRejected { reason, .. } => {
                tracing::warn!(%reason, "order rejected");
            },
            _ => tracing::debug!("order book event: {:?}", event),
        }
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Default)]
pub struct RecordingEventHandler {
    events: Mutex<Vec<OrderEvent>>,
}

impl RecordingEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<OrderEvent> {
        self.events.lock().clone()
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<OrderEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventHandler for RecordingEventHandler {
    fn on_event(&self, event: OrderEvent) {
        self.events.lock().push(event);
    }

    fn on_events(&self, events: Vec<OrderEvent>) {
        self.events.lock().extend(events);
    }
}
