// ============================================================================
// Text Format
// Line-oriented order input and match output used by stream hosts
// ============================================================================
//
// Input lines carry four whitespace-separated fields:
//
//   market <buy|sell> <volume> <ignored number>
//   limit  <buy|sell> <volume> <price>
//   stop   <buy|sell> <volume> <trigger>
//   cancel <ignored>  <target id> <ignored number>
//
// Output lines are `match <takerId> <makerId> <volume> <price>`.

use crate::domain::{Match, Order, OrderId, Side, Volume};
use crate::numeric::{NumericError, Price};
use thiserror::Error;

/// Why an input line could not become an order. The line is rejected alone;
/// a host keeps reading after reporting it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected 4 fields, found {0}")]
    FieldCount(usize),

    #[error("unknown order type {0:?}")]
    UnknownOrderType(String),

    #[error("unknown side {0:?}")]
    UnknownSide(String),

    #[error("invalid volume {0:?}")]
    InvalidVolume(String),

    #[error("invalid order id {0:?}")]
    InvalidOrderId(String),

    #[error("invalid price {value:?}: {source}")]
    InvalidPrice {
        value: String,
        #[source]
        source: NumericError,
    },
}

/// Parse one input line into an unadmitted order.
pub fn parse_order(line: &str) -> Result<Order, ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [kind, side, value1, value2] = fields.as_slice() else {
        return Err(ParseError::FieldCount(fields.len()));
    };

    // The fourth field must be numeric for every type, even where unused
    let price = parse_price(value2)?;

    let order = match *kind {
        "cancel" => Order::cancel(parse_order_id(value1)?),
        "market" => Order::market(parse_side(side)?, parse_volume(value1)?),
        "limit" => Order::limit(parse_side(side)?, parse_volume(value1)?, price),
        "stop" => Order::stop(parse_side(side)?, parse_volume(value1)?, price),
        other => return Err(ParseError::UnknownOrderType(other.to_string())),
    };

    Ok(order)
}

/// Format a match as an output line.
pub fn format_match(matched: &Match) -> String {
    matched.to_string()
}

fn parse_side(token: &str) -> Result<Side, ParseError> {
    match token {
        "buy" => Ok(Side::Buy),
        "sell" => Ok(Side::Sell),
        other => Err(ParseError::UnknownSide(other.to_string())),
    }
}

fn parse_volume(token: &str) -> Result<Volume, ParseError> {
    token
        .parse::<Volume>()
        .map_err(|_| ParseError::InvalidVolume(token.to_string()))
}

fn parse_order_id(token: &str) -> Result<OrderId, ParseError> {
    token
        .parse::<u64>()
        .map(OrderId::new)
        .map_err(|_| ParseError::InvalidOrderId(token.to_string()))
}

fn parse_price(token: &str) -> Result<Price, ParseError> {
    token.parse::<Price>().map_err(|source| ParseError::InvalidPrice {
        value: token.to_string(),
        source,
    })
}
