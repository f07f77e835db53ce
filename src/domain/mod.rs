// ============================================================================
// Domain Models Module
// Orders, matches, configuration and the price index
// ============================================================================

pub mod config;
pub mod matches;
pub mod order;
pub mod price_index;
pub mod snapshot;

pub use config::OrderBookConfig;
pub use matches::{Match, Matches};
pub use order::{Order, OrderId, OrderType, Side, Volume};
pub use price_index::{IndexKind, PriceIndex};
pub use snapshot::OrderBookSnapshot;
