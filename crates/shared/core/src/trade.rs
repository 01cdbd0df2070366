//! Trade actions, results, and account position records

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market::Timestamp;

/// Order direction and placement kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    Buy,
    Sell,
    BuyLimit,
    SellLimit,
    BuyStop,
    SellStop,
}

impl OrderKind {
    /// Pending orders carry a trigger price; market orders do not
    pub fn is_pending(&self) -> bool {
        !matches!(self, Self::Buy | Self::Sell)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::BuyLimit => "BUY_LIMIT",
            Self::SellLimit => "SELL_LIMIT",
            Self::BuyStop => "BUY_STOP",
            Self::SellStop => "SELL_STOP",
        }
    }
}

/// Order-execution action submitted to the trading host.
///
/// One enum instead of per-command host methods: the handler shims
/// build the variant, the host adapter owns the terminal-specific
/// mechanics.
#[derive(Debug, Clone, PartialEq)]
pub enum TradeAction {
    /// Open a position at market (`Buy`/`Sell`) or place a pending
    /// order (limit/stop kinds, `price` required)
    Open {
        kind: OrderKind,
        symbol: String,
        volume: Decimal,
        price: Option<Decimal>,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
        comment: String,
    },
    /// Change stop loss / take profit on an open position
    ModifyPosition {
        ticket: i64,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
    },
    /// Close part of an open position
    ClosePartial { ticket: i64, volume: Decimal },
    /// Close one position by ticket
    CloseById { ticket: i64 },
    /// Close every position on a symbol
    CloseBySymbol { symbol: String },
    /// Change price / stops on a pending order
    ModifyOrder {
        ticket: i64,
        price: Option<Decimal>,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
    },
    /// Cancel a pending order
    CancelOrder { ticket: i64 },
}

/// Result code reported by the trading host for a completed action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeRetcode {
    /// Request completed
    Done,
    /// Request placed but not yet executed
    Placed,
    /// Rejected by the dealer/server
    Rejected,
    /// Malformed request
    Invalid,
    /// Price out of range or stale
    InvalidPrice,
    /// Nothing changed (modify with identical values)
    NoChanges,
    /// Any other terminal-specific code
    Other,
}

impl TradeRetcode {
    /// Whether an execution event with this code is pushed to
    /// subscribers. No-op codes are noise, everything outside the
    /// whitelist is discarded too.
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            Self::Done | Self::Rejected | Self::Invalid | Self::InvalidPrice
        )
    }
}

/// Outcome of a trade action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub retcode: TradeRetcode,
    /// Order ticket assigned by the host, 0 when none
    pub order: i64,
    /// Deal ticket for executed market actions, 0 when none
    pub deal: i64,
    /// Execution price, zero when not applicable
    pub price: Decimal,
    /// Volume actually executed
    pub volume: Decimal,
    /// Host diagnostic text
    pub comment: String,
}

/// Asynchronous trade transaction notification pushed by the host
/// whenever a trade-related request completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeTransaction {
    /// Fields of the originating request, as the host saw them
    pub symbol: String,
    pub kind: Option<OrderKind>,
    pub volume: Decimal,
    pub price: Decimal,
    /// Result of the request
    pub outcome: TradeOutcome,
    /// Host time of completion, epoch seconds
    pub time: Timestamp,
}

/// Open position snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ticket: i64,
    pub symbol: String,
    pub kind: OrderKind,
    pub volume: Decimal,
    pub open_price: Decimal,
    pub current_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub profit: Decimal,
    pub open_time: Timestamp,
}

/// Working (pending) order snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub ticket: i64,
    pub symbol: String,
    pub kind: OrderKind,
    pub volume: Decimal,
    pub price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub placed_time: Timestamp,
}

/// Historical executed deal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub ticket: i64,
    pub order: i64,
    pub symbol: String,
    pub kind: OrderKind,
    pub volume: Decimal,
    pub price: Decimal,
    pub profit: Decimal,
    pub time: Timestamp,
}
