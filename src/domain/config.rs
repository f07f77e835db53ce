// ============================================================================
// Order Book Configuration
// Instrument identity and admission grid
// ============================================================================

use crate::error::EngineError;
use crate::numeric::Price;

use super::{Order, OrderType, Volume};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for one single-instrument book.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookConfig {
    /// The trading instrument (e.g. "BTC-USD", "AAPL")
    pub instrument: String,

    /// Minimum price increment for limit prices and stop triggers.
    /// None means any cent value is accepted.
    pub tick_size: Option<Price>,

    /// Minimum volume increment. None means any positive volume.
    pub lot_size: Option<Volume>,
}

impl OrderBookConfig {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            tick_size: None,
            lot_size: None,
        }
    }

    /// Builder method: Set price tick size
    pub fn with_tick_size(mut self, tick: Price) -> Self {
        self.tick_size = Some(tick);
        self
    }

    /// Builder method: Set lot size
    pub fn with_lot_size(mut self, lot: Volume) -> Self {
        self.lot_size = Some(lot);
        self
    }

    /// Equity-style preset: one cent ticks, single-unit lots
    pub fn cents(instrument: impl Into<String>) -> Self {
        Self::new(instrument)
            .with_tick_size(Price::from_raw(1))
            .with_lot_size(1)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.instrument.trim().is_empty() {
            return Err(EngineError::InvalidConfig(
                "instrument cannot be empty".to_string(),
            ));
        }

        if let Some(tick) = self.tick_size {
            if !tick.is_positive() {
                return Err(EngineError::InvalidConfig(
                    "tick size must be positive".to_string(),
                ));
            }
        }

        if self.lot_size == Some(0) {
            return Err(EngineError::InvalidConfig(
                "lot size must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Check an incoming order against the grid. Cancel orders always pass.
    pub fn check_order(&self, order: &Order) -> Result<(), EngineError> {
        if order.is_cancel() {
            return Ok(());
        }

        if order.side().is_none() {
            return Err(EngineError::InvalidOrder(format!(
                "{} order has no side",
                order.order_type()
            )));
        }

        if order.volume() == 0 {
            return Err(EngineError::InvalidOrder(
                "volume must be positive".to_string(),
            ));
        }

        if let Some(lot) = self.lot_size {
            if order.volume() % lot != 0 {
                return Err(EngineError::InvalidOrder(format!(
                    "volume {} is not a multiple of lot size {}",
                    order.volume(),
                    lot
                )));
            }
        }

        let prices: [Option<Price>; 2] = match order.order_type() {
            OrderType::Limit { price } => [Some(price), None],
            OrderType::Stop { trigger, limit } => [Some(trigger), limit],
            OrderType::Market | OrderType::Cancel { .. } => [None, None],
        };

        for price in prices.iter().flatten() {
            if !price.is_positive() {
                return Err(EngineError::InvalidOrder(format!(
                    "price {} must be positive",
                    price
                )));
            }
            if let Some(tick) = self.tick_size {
                if !price.is_multiple_of(tick) {
                    return Err(EngineError::InvalidOrder(format!(
                        "price {} is not a multiple of tick size {}",
                        price, tick
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for OrderBookConfig {
    fn default() -> Self {
        Self::new("DEFAULT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderId, Side};

    fn price(s: &str) -> Price {
        s.parse().unwrap()
    }

    #[test]
    fn test_config_creation() {
        let config = OrderBookConfig::new("BTC-USD");
        assert_eq!(config.instrument, "BTC-USD");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = OrderBookConfig::new("AAPL")
            .with_tick_size(price("0.05"))
            .with_lot_size(10);

        assert_eq!(config.tick_size, Some(price("0.05")));
        assert_eq!(config.lot_size, Some(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(OrderBookConfig::new("  ").validate().is_err());
        assert!(OrderBookConfig::new("X")
            .with_tick_size(Price::ZERO)
            .validate()
            .is_err());
        assert!(OrderBookConfig::new("X").with_lot_size(0).validate().is_err());
    }

    #[test]
    fn test_order_grid() {
        let config = OrderBookConfig::new("X")
            .with_tick_size(price("0.05"))
            .with_lot_size(5);

        assert!(config.check_order(&Order::limit(Side::Buy, 10, price("1.05"))).is_ok());
        assert!(config.check_order(&Order::limit(Side::Buy, 10, price("1.02"))).is_err());
        assert!(config.check_order(&Order::limit(Side::Buy, 7, price("1.05"))).is_err());
        assert!(config.check_order(&Order::market(Side::Sell, 0)).is_err());
        assert!(config
            .check_order(&Order::stop_limit(Side::Sell, 5, price("2"), price("1.99")))
            .is_err());
        assert!(config.check_order(&Order::cancel(OrderId::new(9))).is_ok());
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let config = OrderBookConfig::default();
        assert!(config.check_order(&Order::limit(Side::Buy, 1, Price::ZERO)).is_err());
        assert!(config.check_order(&Order::stop(Side::Buy, 1, price("-1"))).is_err());
    }
}
