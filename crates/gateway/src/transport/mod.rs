//! Transport abstraction layer
//!
//! Text frames in, text frames out. The trait-based design keeps the
//! engine independent of the concrete transport; the shipped
//! implementation is in-process tokio channels, and a socket transport
//! can slot in behind the same traits.

pub mod channel;

use crate::error::TransportError;
use async_trait::async_trait;

/// Publisher - sends encoded frames to one channel
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish a frame
    async fn publish(&self, frame: &str) -> Result<(), TransportError>;
}

/// Subscriber - receives encoded frames from one channel
#[async_trait]
pub trait Subscriber: Send {
    /// Wait for the next frame
    async fn next(&mut self) -> Result<String, TransportError>;

    /// Receive without blocking; `None` when the channel is empty.
    /// The dispatcher uses this to drain a channel to exhaustion
    /// within a tick.
    fn try_next(&mut self) -> Result<Option<String>, TransportError>;
}
