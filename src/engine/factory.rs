// ============================================================================
// Order Book Factory
// Creates order books with proper configuration
// ============================================================================

use crate::domain::config::OrderBookConfig;
use crate::domain::Volume;
use crate::engine::OrderBook;
use crate::error::EngineResult;
use crate::interfaces::{EventHandler, NoOpEventHandler};
use crate::numeric::Price;
use std::sync::Arc;

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates an order book from configuration
///
/// # Arguments
/// * `config` - Order book configuration
/// * `event_handler` - Event handler for order and match events
///
/// # Returns
/// * `EngineResult<OrderBook>` - Configured order book, or `InvalidConfig`
///
/// # Example
/// ```
/// use order_match::prelude::*;
/// use order_match::engine::factory::create_from_config;
/// use std::sync::Arc;
///
/// let config = OrderBookConfig::cents("AAPL");
/// let book = create_from_config(config, Arc::new(NoOpEventHandler)).unwrap();
/// assert_eq!(book.instrument(), "AAPL");
/// ```
pub fn create_from_config(
    config: OrderBookConfig,
    event_handler: Arc<dyn EventHandler>,
) -> EngineResult<OrderBook> {
    tracing::debug!(
        instrument = %config.instrument,
        tick_size = ?config.tick_size,
        lot_size = ?config.lot_size,
        "creating order book"
    );
    OrderBook::with_event_handler(config, event_handler)
}

// ============================================================================
// Builder Pattern
// ============================================================================

/// Builder for creating order books with a fluent API
///
/// # Example
/// ```
/// use order_match::prelude::*;
/// use order_match::engine::factory::OrderBookBuilder;
/// use std::sync::Arc;
///
/// let book = OrderBookBuilder::new("BTC-USD")
///     .with_tick_size("0.05".parse().unwrap())
///     .with_lot_size(10)
///     .event_handler(Arc::new(LoggingEventHandler))
///     .build()
///     .unwrap();
/// assert_eq!(book.config().lot_size, Some(10));
/// ```
pub struct OrderBookBuilder {
    config: OrderBookConfig,
    event_handler: Arc<dyn EventHandler>,
}

impl OrderBookBuilder {
    /// Create a new builder for the specified instrument
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            config: OrderBookConfig::new(instrument),
            event_handler: Arc::new(NoOpEventHandler),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: OrderBookConfig) -> Self {
        Self {
            config,
            event_handler: Arc::new(NoOpEventHandler),
        }
    }

    /// Set price tick size
    pub fn with_tick_size(mut self, tick_size: Price) -> Self {
        self.config.tick_size = Some(tick_size);
        self
    }

    /// Set lot size
    pub fn with_lot_size(mut self, lot_size: Volume) -> Self {
        self.config.lot_size = Some(lot_size);
        self
    }

    pub fn event_handler(mut self, event_handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = event_handler;
        self
    }

    /// Build the order book
    pub fn build(self) -> EngineResult<OrderBook> {
        create_from_config(self.config, self.event_handler)
    }

    /// Get the configuration without building (for inspection)
    pub fn get_config(&self) -> &OrderBookConfig {
        &self.config
    }
}
