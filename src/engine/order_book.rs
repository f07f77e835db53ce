// ============================================================================
// Order Book
// Admission, cancellation and matching orchestration for one instrument
// ============================================================================

use chrono::Utc;
use std::sync::Arc;

use super::matcher::Matcher;
use super::state::BookState;
use super::stop_monitor::StopTriggerMonitor;
use crate::domain::{
    Matches, Order, OrderBookConfig, OrderBookSnapshot, OrderId, OrderType, Side,
};
use crate::error::{EngineError, EngineResult};
use crate::interfaces::{CancelReason, EventHandler, NoOpEventHandler, OrderEvent};
use crate::numeric::Price;

/// Single-instrument order book with price/time matching and stop orders.
///
/// `add` is the only operation that changes the book. Each call runs to
/// completion, stop cascade included, before it returns. The book has no
/// internal locking: hosts with several producers wrap it in a
/// [`super::SharedOrderBook`] or feed it through an [`super::OrderSequencer`].
///
/// Market orders, and stop orders without a limit once triggered, never
/// rest: whatever part finds no liquidity is cancelled.
pub struct OrderBook {
    config: OrderBookConfig,
    state: BookState,
    /// First fault seen. While set, `add` refuses work.
    fault: Option<EngineError>,
    event_handler: Arc<dyn EventHandler>,
}

impl OrderBook {
    pub fn new(config: OrderBookConfig) -> EngineResult<Self> {
        Self::with_event_handler(config, Arc::new(NoOpEventHandler))
    }

    pub fn with_event_handler(
        config: OrderBookConfig,
        event_handler: Arc<dyn EventHandler>,
    ) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: BookState::new(),
            fault: None,
            event_handler,
        })
    }

    /// Admit an order and return every match it caused, in the order the
    /// matches were applied: its own matches first, then those of any stop
    /// orders they triggered.
    ///
    /// The order gets the next id whatever its type:
    /// - cancel orders disable their target if it is still live, and never match
    /// - stop orders wait in the pending index and never match on admission
    /// - market and limit orders match immediately
    ///
    /// # Errors
    /// `InvalidOrder` leaves the book untouched. `InvariantViolation` and
    /// `StructuralFault` halt the book; later calls return `Halted` until
    /// [`OrderBook::reset`].
    pub fn add(&mut self, order: Order) -> EngineResult<Matches> {
        if let Some(fault) = &self.fault {
            return Err(EngineError::Halted(fault.to_string()));
        }

        if let Err(err) = self.check_admission(&order) {
            tracing::debug!(instrument = %self.config.instrument, %err, "order rejected");
            self.event_handler.on_event(OrderEvent::OrderRejected {
                reason: err.to_string(),
                timestamp: Utc::now(),
            });
            return Err(err);
        }

        let mut events = Vec::new();
        let result = Self::process(&mut self.state, order, &mut events);

        if let Err(err) = &result {
            if err.is_fault() {
                tracing::error!(instrument = %self.config.instrument, %err, "order book halted");
                events.push(OrderEvent::BookHalted {
                    reason: err.to_string(),
                    timestamp: Utc::now(),
                });
                self.fault = Some(err.clone());
            }
        }

        self.event_handler.on_events(events);
        result
    }

    /// Drop every order, index entry and fault. The configuration and event
    /// handler are kept, and ids start again at 1.
    pub fn reset(&mut self) {
        tracing::info!(instrument = %self.config.instrument, "order book reset");
        self.state = BookState::new();
        self.fault = None;
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn config(&self) -> &OrderBookConfig {
        &self.config
    }

    pub fn instrument(&self) -> &str {
        &self.config.instrument
    }

    pub fn is_halted(&self) -> bool {
        self.fault.is_some()
    }

    pub fn fault(&self) -> Option<&EngineError> {
        self.fault.as_ref()
    }

    /// Any admitted order, including executed and cancelled ones.
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.state.get(id)
    }

    /// All admitted orders in admission order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.state.orders.iter()
    }

    /// Ids cancelled so far, by request or as unfilled market remainders.
    pub fn cancelled_ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.state.cancelled.iter().copied()
    }

    pub fn next_order_id(&self) -> OrderId {
        self.state.next_id
    }

    pub fn last_price(&self) -> Option<Price> {
        self.state.last_price
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.state.bids.iter_from(true).next().map(|(price, _)| price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.state.asks.iter_from(false).next().map(|(price, _)| price)
    }

    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => ask.checked_sub(bid).ok(),
            _ => None,
        }
    }

    /// Resting orders on one side.
    pub fn open_order_count(&self, side: Side) -> usize {
        self.state.index(side).len()
    }

    pub fn pending_stop_count(&self) -> usize {
        self.state.stops.len()
    }

    /// Aggregated price levels, `depth` levels per side, best first.
    pub fn snapshot(&self, depth: usize) -> EngineResult<OrderBookSnapshot> {
        Ok(OrderBookSnapshot::with_depth(
            self.config.instrument.clone(),
            self.state.depth(Side::Buy, depth)?,
            self.state.depth(Side::Sell, depth)?,
            self.state.last_price,
            self.state.stops.len(),
        ))
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn check_admission(&self, order: &Order) -> EngineResult<()> {
        if order.id().is_assigned() {
            return Err(EngineError::InvalidOrder(format!(
                "order was already admitted as #{}",
                order.id()
            )));
        }
        if order.remaining_volume() != order.volume()
            || order.is_cancelled()
            || order.is_executed()
            || order.is_triggered()
        {
            return Err(EngineError::InvalidOrder(
                "new orders cannot carry execution state".to_string(),
            ));
        }
        self.config.check_order(order)
    }

    fn process(
        state: &mut BookState,
        order: Order,
        events: &mut Vec<OrderEvent>,
    ) -> EngineResult<Matches> {
        let id = state.store(order);
        let order = state.order(id)?;
        tracing::debug!(order = %order, "order admitted");
        events.push(OrderEvent::OrderAccepted {
            order_id: id,
            timestamp: Utc::now(),
        });

        match order.order_type() {
            OrderType::Cancel { target } => {
                Self::cancel(state, id, target, events)?;
                Ok(Matches::new())
            },
            OrderType::Stop { trigger, .. } => {
                state.stops.insert(trigger, id);
                events.push(OrderEvent::StopPending {
                    order_id: id,
                    trigger,
                    timestamp: Utc::now(),
                });
                Ok(Matches::new())
            },
            OrderType::Market | OrderType::Limit { .. } => {
                if let (Some(side), Some(limit)) = (order.side(), order.limit_price()) {
                    state.index(side).insert(limit, id);
                }

                let mut matches = Self::execute(state, id, events)?;
                let cascade = StopTriggerMonitor::cascade(state, &matches, events, Self::execute)?;
                matches.extend(cascade);
                Ok(matches)
            },
        }
    }

    /// Run the matcher for an active order, then settle what is left:
    /// limit remainders stay in their index, market-like remainders are
    /// cancelled.
    fn execute(
        state: &mut BookState,
        id: OrderId,
        events: &mut Vec<OrderEvent>,
    ) -> EngineResult<Matches> {
        let matches = Matcher::run(state, id, events)?;

        let order = state.order(id)?;
        if order.is_executed() {
            return Ok(matches);
        }

        let remaining = order.remaining_volume();
        match (order.side(), order.limit_price()) {
            (Some(side), Some(price)) if !order.is_market_like() => {
                tracing::debug!(order = %id, %side, %price, remaining, "order resting");
                events.push(OrderEvent::OrderRested {
                    order_id: id,
                    side,
                    price,
                    remaining,
                    timestamp: Utc::now(),
                });
            },
            _ => {
                tracing::debug!(order = %id, remaining, "unfilled market remainder cancelled");
                state.order_mut(id)?.mark_cancelled();
                state.cancelled.insert(id);
                events.push(OrderEvent::OrderCancelled {
                    order_id: id,
                    reason: CancelReason::UnfilledMarket,
                    timestamp: Utc::now(),
                });
            },
        }

        Ok(matches)
    }

    /// Tombstone `target` on behalf of cancel order `id`. Unknown, executed
    /// and already cancelled targets are ignored.
    fn cancel(
        state: &mut BookState,
        id: OrderId,
        target: OrderId,
        events: &mut Vec<OrderEvent>,
    ) -> EngineResult<()> {
        let live = state
            .get(target)
            .filter(|t| t.id() < id && !t.is_cancel() && !t.is_executed() && !t.is_cancelled());

        let Some(order) = live else {
            tracing::debug!(order = %id, %target, "cancel target not live, ignored");
            events.push(OrderEvent::CancelIgnored {
                order_id: id,
                target,
                timestamp: Utc::now(),
            });
            return Ok(());
        };

        match (order.trigger_price(), order.is_triggered(), order.side(), order.limit_price()) {
            (Some(trigger), false, _, _) => state.stops.delete(trigger, target)?,
            (_, _, Some(side), Some(limit)) => state.index(side).delete(limit, target)?,
            _ => {},
        }

        state.order_mut(target)?.mark_cancelled();
        state.cancelled.insert(target);
        tracing::debug!(order = %id, %target, "order cancelled");
        events.push(OrderEvent::OrderCancelled {
            order_id: target,
            reason: CancelReason::Requested,
            timestamp: Utc::now(),
        });
        Ok(())
    }
}
