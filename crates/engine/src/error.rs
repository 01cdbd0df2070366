//! Command-level error taxonomy
//!
//! Every variant maps to one ERROR envelope; the request_id is echoed
//! by the router when it was recoverable.

use termlink_ports::HostError;
use thiserror::Error;

use crate::subscriptions::StreamError;

#[derive(Error, Debug)]
pub enum CommandError {
    /// Missing or invalid command fields
    #[error("{0}")]
    Validation(String),

    /// The trading host rejected or failed the action
    #[error("{0}")]
    Host(#[from] HostError),

    /// Subscription transition failed
    #[error("{0}")]
    Stream(#[from] StreamError),

    /// Response fields failed to serialize
    #[error("Internal serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CommandError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
