use termlink_core::TradeRetcode;
use thiserror::Error;

/// Errors reported by the trading host collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("No data for {symbol} {timeframe}")]
    NoData { symbol: String, timeframe: String },

    #[error("Ticket not found: {0}")]
    UnknownTicket(i64),

    #[error("Trade rejected ({retcode:?}): {message}")]
    Rejected {
        retcode: TradeRetcode,
        message: String,
    },

    #[error("Indicator not supported: {0}")]
    UnsupportedIndicator(String),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

pub type HostResult<T> = std::result::Result<T, HostError>;
