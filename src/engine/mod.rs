// ============================================================================
// Engine Module
// Contains the core matching business logic
// ============================================================================

mod matcher;
mod order_book;
mod shared;
mod state;
mod stop_monitor;

pub mod factory;

pub use factory::{create_from_config, OrderBookBuilder};
pub use order_book::OrderBook;
pub use shared::{OrderSequencer, SharedOrderBook};
