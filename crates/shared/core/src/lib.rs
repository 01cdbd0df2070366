//! Termlink Core
//!
//! Pure wire and domain types for the terminal bridge.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod account;
pub mod market;
pub mod message;
pub mod payload;
pub mod trade;

// Re-export commonly used types at crate root
pub use account::{AccountBalance, AccountFlags, AccountInfo, AccountMargin, BrokerInfo};
pub use market::{Bar, IndicatorSpec, Tick, Timeframe, Timestamp};
pub use message::{MessageKind, OutboundMessage, RawInbound, Status};
pub use payload::Payload;
pub use trade::{
    Deal, OrderKind, PendingOrder, Position, TradeAction, TradeOutcome, TradeRetcode,
    TradeTransaction,
};
