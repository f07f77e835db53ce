// ============================================================================
// Stop-Trigger Monitor
// Promotes pending stop orders crossed by execution prices
// ============================================================================

use std::collections::VecDeque;

use chrono::Utc;
use smallvec::SmallVec;

use super::state::BookState;
use crate::domain::{Match, Matches, OrderId};
use crate::error::{EngineError, EngineResult};
use crate::interfaces::OrderEvent;
use crate::numeric::Price;

/// Stops fired by a single execution price. Usually a handful.
pub(crate) type TriggeredStops = SmallVec<[OrderId; 8]>;

pub(crate) struct StopTriggerMonitor;

impl StopTriggerMonitor {
    /// Pending stops crossed by a trade at `price`, oldest first.
    ///
    /// Buy stops fire when `price > trigger`, sell stops when
    /// `price < trigger`. A trade exactly at the trigger fires nothing.
    pub(crate) fn triggered_by(state: &BookState, price: Price) -> EngineResult<TriggeredStops> {
        let mut fired = TriggeredStops::new();

        let below = state.stops.strictly_below(price);
        let above = state.stops.strictly_above(price);
        for (trigger, id) in below.into_iter().chain(above) {
            let stop = state.order(id)?;
            if !stop.is_stop()
                || stop.is_triggered()
                || stop.is_cancelled()
                || stop.trigger_price() != Some(trigger)
            {
                return Err(EngineError::StructuralFault(format!(
                    "pending stop index holds {} at {}",
                    stop, trigger
                )));
            }
            if stop.is_triggered_by(price) {
                fired.push(id);
            }
        }

        fired.sort_unstable();
        Ok(fired)
    }

    /// Follow the trigger cascade started by `initial`.
    ///
    /// Execution prices are processed in the order the trades happened.
    /// Every stop they fire is promoted and matched through `execute`, and
    /// the prices of its own trades join the back of the queue. Each stop
    /// leaves the pending index when promoted, so it fires at most once and
    /// the cascade ends once no new trade crosses a pending trigger.
    pub(crate) fn cascade<F>(
        state: &mut BookState,
        initial: &[Match],
        events: &mut Vec<OrderEvent>,
        mut execute: F,
    ) -> EngineResult<Matches>
    where
        F: FnMut(&mut BookState, OrderId, &mut Vec<OrderEvent>) -> EngineResult<Matches>,
    {
        let mut prices: VecDeque<Price> = initial.iter().map(|m| m.price).collect();
        let mut matches = Matches::new();

        while let Some(price) = prices.pop_front() {
            for stop_id in Self::triggered_by(state, price)? {
                if state.order(stop_id)?.is_triggered() {
                    continue;
                }
                Self::promote(state, stop_id, price, events)?;

                let produced = execute(state, stop_id, events)?;
                prices.extend(produced.iter().map(|m| m.price));
                matches.extend(produced);
            }
        }

        Ok(matches)
    }

    /// Mark a stop triggered and move it from the pending index into matching.
    /// Stop-limit orders enter their side's index; stop-market orders are
    /// matched without resting.
    fn promote(
        state: &mut BookState,
        stop_id: OrderId,
        price: Price,
        events: &mut Vec<OrderEvent>,
    ) -> EngineResult<()> {
        let stop = state.order(stop_id)?;
        let (trigger, limit, side) = match (stop.trigger_price(), stop.side()) {
            (Some(trigger), Some(side)) => (trigger, stop.limit_price(), side),
            _ => {
                return Err(EngineError::StructuralFault(format!(
                    "order {} cannot be promoted as a stop",
                    stop_id
                )))
            },
        };

        state.stops.delete(trigger, stop_id)?;
        state.order_mut(stop_id)?.mark_triggered();
        if let Some(limit) = limit {
            state.index(side).insert(limit, stop_id);
        }

        tracing::debug!(
            order = %stop_id,
            side = %side,
            %trigger,
            %price,
            "stop order triggered"
        );
        events.push(OrderEvent::StopTriggered {
            order_id: stop_id,
            price,
            timestamp: Utc::now(),
        });
        Ok(())
    }
}
