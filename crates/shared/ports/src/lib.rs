//! Termlink Ports
//!
//! Port definitions (traits) for the terminal bridge. These define the
//! boundary between the dispatcher/streaming engine and the
//! infrastructure behind it: the live trading terminal and the clock.

mod clock;
mod error;
mod host;

pub use clock::Clock;
pub use error::{HostError, HostResult};
pub use host::TradingHost;
