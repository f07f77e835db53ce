//! Property tests over random order streams.

use order_match::numeric::Price;
use order_match::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Market(Side, u64),
    Limit(Side, u64, i64),
    Stop(Side, u64, i64),
    StopLimit(Side, u64, i64, i64),
    Cancel(u64),
}

impl Op {
    fn into_order(self) -> Order {
        let price = |value: i64| Price::from_integer(value).unwrap();
        match self {
            Op::Market(side, volume) => Order::market(side, volume),
            Op::Limit(side, volume, limit) => Order::limit(side, volume, price(limit)),
            Op::Stop(side, volume, trigger) => Order::stop(side, volume, price(trigger)),
            Op::StopLimit(side, volume, trigger, limit) => {
                Order::stop_limit(side, volume, price(trigger), price(limit))
            },
            Op::Cancel(target) => Order::cancel(OrderId::new(target)),
        }
    }
}

fn side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Buy), Just(Side::Sell)]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => (side(), 1..20u64).prop_map(|(s, v)| Op::Market(s, v)),
        6 => (side(), 1..20u64, 90..110i64).prop_map(|(s, v, p)| Op::Limit(s, v, p)),
        2 => (side(), 1..20u64, 90..110i64).prop_map(|(s, v, t)| Op::Stop(s, v, t)),
        1 => (side(), 1..20u64, 90..110i64, 90..110i64)
            .prop_map(|(s, v, t, l)| Op::StopLimit(s, v, t, l)),
        1 => (1..60u64).prop_map(Op::Cancel),
    ]
}

/// Replay `ops` and return the book plus the matches of every step.
/// Step `k` is the admission of order id `k + 1`.
fn replay(ops: Vec<Op>) -> (OrderBook, Vec<Matches>) {
    let mut book = OrderBook::new(OrderBookConfig::new("PROP")).unwrap();
    let steps = ops
        .into_iter()
        .map(|op| book.add(op.into_order()).unwrap())
        .collect();
    (book, steps)
}

proptest! {
    #[test]
    fn filled_volume_equals_matched_volume(ops in prop::collection::vec(op(), 1..60)) {
        let (book, steps) = replay(ops);
        let matches: Vec<&Match> = steps.iter().flatten().collect();

        for order in book.orders() {
            let matched: u64 = matches
                .iter()
                .filter(|m| m.taker == order.id() || m.maker == order.id())
                .map(|m| m.volume)
                .sum();
            prop_assert_eq!(order.filled_volume(), matched);
            prop_assert!(order.remaining_volume() <= order.volume());
            prop_assert_eq!(order.is_executed(), !order.is_cancel() && order.remaining_volume() == 0);
        }
    }

    #[test]
    fn matches_respect_prices_and_sides(ops in prop::collection::vec(op(), 1..60)) {
        let (book, steps) = replay(ops);

        for m in steps.iter().flatten() {
            prop_assert!(m.volume > 0);
            let taker = book.order(m.taker).unwrap();
            let maker = book.order(m.maker).unwrap();

            prop_assert_ne!(taker.side(), maker.side());
            prop_assert_eq!(Some(m.price), maker.limit_price());

            match (taker.side(), taker.limit_price()) {
                (Some(Side::Buy), Some(limit)) => prop_assert!(m.price <= limit),
                (Some(Side::Sell), Some(limit)) => prop_assert!(m.price >= limit),
                _ => {},
            }
        }
    }

    #[test]
    fn book_is_never_crossed(ops in prop::collection::vec(op(), 1..60)) {
        let mut book = OrderBook::new(OrderBookConfig::new("PROP")).unwrap();
        for op in ops {
            book.add(op.into_order()).unwrap();
            if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
                prop_assert!(bid < ask, "bid {} crosses ask {}", bid, ask);
            }
        }
    }

    #[test]
    fn stops_fire_only_strictly_beyond_trigger(ops in prop::collection::vec(op(), 1..60)) {
        let (book, steps) = replay(ops);

        for stop in book.orders().filter(|o| o.is_stop() && !o.is_cancelled()) {
            let (Some(trigger), Some(side)) = (stop.trigger_price(), stop.side()) else {
                continue;
            };
            // Trades that happened after the stop was admitted
            let mut later = steps
                .iter()
                .skip(stop.id().value() as usize)
                .flatten();
            let crossed = later.any(|m| match side {
                Side::Buy => m.price > trigger,
                Side::Sell => m.price < trigger,
            });

            prop_assert_eq!(stop.is_triggered(), crossed, "stop {}", stop);
        }
    }
}

#[test]
fn sorted_inserts_stay_ordered() {
    let mut book = OrderBook::new(OrderBookConfig::new("SORTED")).unwrap();
    for i in 1..=2_000 {
        book.add(Order::limit(Side::Sell, 1, Price::from_integer(i).unwrap()))
            .unwrap();
    }

    let matches = book.add(Order::market(Side::Buy, 2_000)).unwrap();
    assert_eq!(matches.len(), 2_000);
    assert!(matches.windows(2).all(|w| w[0].price < w[1].price));
}
