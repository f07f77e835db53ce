// ============================================================================
// Matcher
// Price/time priority matching of one taker against the opposite side
// ============================================================================

use std::cmp::Ordering;

use super::state::BookState;
use crate::domain::{Match, Matches, Order, OrderId, Side};
use crate::error::{EngineError, EngineResult};
use crate::interfaces::OrderEvent;
use crate::numeric::Price;
use chrono::Utc;

/// Price/Time priority matcher.
///
/// Each round queries the opposite price index for every maker the taker's
/// limit allows, prices a provisional match against each, and applies only
/// the best one. Rounds repeat until the taker is executed or nothing
/// qualifies.
///
/// # Example
/// ```text
/// Asks:  105 x 5 (#1)
///        100 x 5 (#2)
///
/// Incoming: market buy 7 (#3)
/// Result:   match 3 2 5 100.00
///           match 3 1 2 105.00
/// ```
pub(crate) struct Matcher;

impl Matcher {
    /// Match `taker_id` until it is executed or runs out of counter-orders.
    /// Applied matches are returned in application order.
    pub(crate) fn run(
        state: &mut BookState,
        taker_id: OrderId,
        events: &mut Vec<OrderEvent>,
    ) -> EngineResult<Matches> {
        let mut matches = Matches::new();

        while let Some(best) = Self::best_match(state, taker_id)? {
            state.apply(&best)?;
            tracing::debug!(
                taker = %best.taker,
                maker = %best.maker,
                volume = best.volume,
                price = %best.price,
                "orders matched"
            );
            events.push(OrderEvent::OrderMatched {
                matched: best,
                timestamp: Utc::now(),
            });
            matches.push(best);
        }

        Ok(matches)
    }

    /// The single best match available to `taker_id` right now, if any.
    pub(crate) fn best_match(state: &BookState, taker_id: OrderId) -> EngineResult<Option<Match>> {
        let taker = state.order(taker_id)?;
        if !taker.is_active() || taker.remaining_volume() == 0 {
            return Ok(None);
        }
        let side = taker.side().ok_or_else(|| {
            EngineError::InvariantViolation(format!("taker {} has no side", taker_id))
        })?;

        // A buyer sweeps asks at or below its limit, a seller bids at or above
        let candidates = state
            .index(side.opposite())
            .candidates_at_or_better(taker.limit_price(), side == Side::Sell);

        let mut best: Option<Match> = None;
        for (price, maker_id) in candidates {
            let maker = state.order(maker_id)?;
            if !maker.is_active() || maker.limit_price() != Some(price) {
                return Err(EngineError::StructuralFault(format!(
                    "index entry {} at {} does not match order {}",
                    maker_id, price, maker
                )));
            }

            let Some(candidate) = provisional_match(taker, maker, price) else {
                continue;
            };
            best = match best {
                Some(current) if rank(side, &current, &candidate) != Ordering::Greater => {
                    Some(current)
                },
                _ => Some(candidate),
            };
        }

        if let Some(found) = &best {
            tracing::trace!(taker = %taker_id, maker = %found.maker, "best counter-order selected");
        }
        Ok(best)
    }
}

/// Price a match between `taker` and a resting `maker` priced at `price`.
///
/// `None` when the two cannot trade: same side, a cancel order on either
/// end, an untriggered stop as maker, or a price outside the taker's limit.
pub(crate) fn provisional_match(taker: &Order, maker: &Order, price: Price) -> Option<Match> {
    let (taker_side, maker_side) = (taker.side()?, maker.side()?);
    if taker_side == maker_side || taker.is_cancel() || maker.is_cancel() {
        return None;
    }
    if maker.is_stop() && !maker.is_triggered() {
        return None;
    }

    if let Some(limit) = taker.limit_price() {
        let acceptable = match taker_side {
            Side::Buy => price <= limit,
            Side::Sell => price >= limit,
        };
        if !acceptable {
            return None;
        }
    }

    let volume = taker.remaining_volume().min(maker.remaining_volume());
    if volume == 0 {
        return None;
    }

    Some(Match::new(taker.id(), maker.id(), volume, price))
}

/// Total order on provisional matches for a taker on `taker_side`:
/// better price first (lowest ask for a buyer, highest bid for a seller),
/// then older maker first. `Less` means `a` is preferred.
pub(crate) fn rank(taker_side: Side, a: &Match, b: &Match) -> Ordering {
    let by_price = match taker_side {
        Side::Buy => a.price.cmp(&b.price),
        Side::Sell => b.price.cmp(&a.price),
    };
    by_price.then_with(|| a.maker.cmp(&b.maker))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(value: i64) -> Price {
        Price::from_integer(value).unwrap()
    }

    fn rest(state: &mut BookState, order: Order) -> OrderId {
        let side = order.side().unwrap();
        let limit = order.limit_price().unwrap();
        let id = state.store(order);
        state.index(side).insert(limit, id);
        id
    }

    #[test]
    fn test_rank_prefers_price_then_age() {
        let cheap_new = Match::new(OrderId::new(9), OrderId::new(5), 1, price(99));
        let cheap_old = Match::new(OrderId::new(9), OrderId::new(2), 1, price(99));
        let dear_old = Match::new(OrderId::new(9), OrderId::new(1), 1, price(101));

        assert_eq!(rank(Side::Buy, &cheap_new, &dear_old), Ordering::Less);
        assert_eq!(rank(Side::Sell, &cheap_new, &dear_old), Ordering::Greater);
        assert_eq!(rank(Side::Buy, &cheap_old, &cheap_new), Ordering::Less);
        assert_eq!(rank(Side::Sell, &cheap_old, &cheap_new), Ordering::Less);
    }

    #[test]
    fn test_provisional_match_filters() {
        let mut buy = Order::limit(Side::Buy, 10, price(100));
        buy.assign_id(OrderId::new(1));
        let mut sell = Order::limit(Side::Sell, 4, price(100));
        sell.assign_id(OrderId::new(2));
        let mut other_buy = Order::limit(Side::Buy, 4, price(100));
        other_buy.assign_id(OrderId::new(3));
        let mut stop = Order::stop_limit(Side::Sell, 4, price(90), price(100));
        stop.assign_id(OrderId::new(4));

        let m = provisional_match(&buy, &sell, price(100)).unwrap();
        assert_eq!((m.volume, m.price), (4, price(100)));

        assert!(provisional_match(&buy, &other_buy, price(100)).is_none());
        assert!(provisional_match(&buy, &sell, price(101)).is_none());
        assert!(provisional_match(&buy, &stop, price(100)).is_none());
        assert!(provisional_match(&buy, &Order::cancel(OrderId::new(1)), price(100)).is_none());
    }

    #[test]
    fn test_sell_taker_takes_highest_bid_oldest_first() {
        let mut state = BookState::new();
        rest(&mut state, Order::limit(Side::Buy, 1, price(99)));
        let second = rest(&mut state, Order::limit(Side::Buy, 1, price(101)));
        rest(&mut state, Order::limit(Side::Buy, 1, price(101)));
        let taker = rest(&mut state, Order::limit(Side::Sell, 1, price(98)));

        let best = Matcher::best_match(&state, taker).unwrap().unwrap();
        assert_eq!(best.maker, second);
        assert_eq!(best.price, price(101));
    }

    #[test]
    fn test_run_sweeps_best_price_first() {
        let mut state = BookState::new();
        let dear = rest(&mut state, Order::limit(Side::Sell, 5, price(105)));
        let cheap = rest(&mut state, Order::limit(Side::Sell, 5, price(100)));
        let taker = state.store(Order::market(Side::Buy, 7));

        let mut events = Vec::new();
        let matches = Matcher::run(&mut state, taker, &mut events).unwrap();

        assert_eq!(
            matches,
            vec![
                Match::new(taker, cheap, 5, price(100)),
                Match::new(taker, dear, 2, price(105)),
            ]
        );
        assert_eq!(events.len(), 2);
        assert!(state.order(taker).unwrap().is_executed());
        assert_eq!(state.order(dear).unwrap().remaining_volume(), 3);
    }

    #[test]
    fn test_limit_stops_at_its_bound() {
        let mut state = BookState::new();
        rest(&mut state, Order::limit(Side::Sell, 5, price(100)));
        let out_of_range = rest(&mut state, Order::limit(Side::Sell, 5, price(102)));
        let taker = rest(&mut state, Order::limit(Side::Buy, 8, price(101)));

        let matches = Matcher::run(&mut state, taker, &mut Vec::new()).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(state.order(taker).unwrap().remaining_volume(), 3);
        assert_eq!(state.order(out_of_range).unwrap().remaining_volume(), 5);
    }

    #[test]
    fn test_index_entry_for_dead_order_is_a_fault() {
        let mut state = BookState::new();
        let maker = rest(&mut state, Order::limit(Side::Sell, 5, price(100)));
        state.order_mut(maker).unwrap().mark_cancelled();
        let taker = state.store(Order::market(Side::Buy, 1));

        let result = Matcher::best_match(&state, taker);
        assert!(matches!(result, Err(EngineError::StructuralFault(_))));
    }
}
