//! Error types for the gateway crate

use thiserror::Error;

/// Transport-level errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Send failed: {0}")]
    Send(String),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Invalid port: {0}")]
    InvalidPort(u16),

    #[error("Port {0} assigned to more than one channel")]
    PortCollision(u16),
}

/// Wire-format errors
#[derive(Error, Debug)]
pub enum CodecError {
    /// Inbound text was not a valid envelope. Callers log and drop:
    /// no request_id is recoverable, so no reply is possible.
    #[error("Malformed inbound message: {0}")]
    Parse(String),
}
