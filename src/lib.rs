// ============================================================================
// Order Matching Library
// Single-instrument order book with price/time priority and stop orders
// ============================================================================

//! # Order Match
//!
//! An in-memory matching engine for one instrument.
//!
//! ## Features
//!
//! - **Market, limit, stop and cancel orders** behind a single `add` call
//! - **Price/time priority**: best price first, oldest order first within a price
//! - **Stop orders** that fire strictly beyond their trigger and cascade
//! - **Fixed-point prices** with no floating point anywhere in matching
//! - **Event stream** for audit and logging hosts
//!
//! ## Example
//!
//! ```rust
//! use order_match::prelude::*;
//! use order_match::numeric::Price;
//!
//! let mut book = OrderBook::new(OrderBookConfig::new("BTC-USD")).unwrap();
//!
//! let price = Price::from_integer(50_000).unwrap();
//! book.add(Order::limit(Side::Sell, 2, price)).unwrap();
//!
//! let matches = book.add(Order::market(Side::Buy, 1)).unwrap();
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].to_string(), "match 2 1 1 50000.00");
//!
//! let snapshot = book.snapshot(10).unwrap();
//! println!("Best ask: {:?}", snapshot.best_ask());
//! ```

pub mod domain;
pub mod engine;
pub mod error;
pub mod interfaces;
pub mod numeric;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        Match, Matches, Order, OrderBookConfig, OrderBookSnapshot, OrderId, OrderType, Side,
        Volume,
    };
    pub use crate::engine::{
        create_from_config, OrderBook, OrderBookBuilder, OrderSequencer, SharedOrderBook,
    };
    pub use crate::error::{EngineError, EngineResult};
    pub use crate::interfaces::{
        format_match, parse_order, CancelReason, EventHandler, LoggingEventHandler,
        NoOpEventHandler, OrderEvent, RecordingEventHandler,
    };
}
