//! Termlink Gateway
//!
//! Transport and wire-format layer for the terminal bridge:
//! - JSON codec with defensive framing repair on encode
//! - Publisher/Subscriber transport traits with an in-process tokio
//!   channel implementation
//! - The five-channel bus (admin, data, trade, live, events) bound to
//!   externally configured, pairwise-distinct ports
//!
//! The trait seams let a socket transport replace the channel
//! implementation without touching the engine.

pub mod bus;
pub mod codec;
pub mod error;
pub mod transport;

// Re-export commonly used types
pub use bus::{Bus, BusClient, ChannelPorts, ClientEnd};
pub use error::{CodecError, TransportError};
pub use transport::{
    Publisher, Subscriber,
    channel::{ChannelPublisher, ChannelSubscriber, InboundQueue, InboundSender},
};
