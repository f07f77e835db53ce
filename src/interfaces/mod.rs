// ============================================================================
// Interfaces Module
// Contracts and formats at the edges of the order book
// ============================================================================

mod event_handler;
pub mod text_format;

pub use event_handler::{
    CancelReason, EventHandler, LoggingEventHandler, NoOpEventHandler, OrderEvent,
    RecordingEventHandler,
};
pub use text_format::{format_match, parse_order, ParseError};
