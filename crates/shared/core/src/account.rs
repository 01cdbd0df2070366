//! Account and broker snapshot types returned by the trading host

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Broker identity as reported by the terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerInfo {
    pub company: String,
    pub server: String,
}

/// Account identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub login: i64,
    pub name: String,
    pub currency: String,
}

/// Balance snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub balance: Decimal,
    pub equity: Decimal,
    pub currency: String,
}

/// Margin snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMargin {
    pub margin: Decimal,
    pub free_margin: Decimal,
    /// Percentage, zero when no positions are open
    pub margin_level: Decimal,
}

/// Permission flags controlling whether the bridge may trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFlags {
    /// Algorithmic trading enabled on the account/server side
    pub trade_allowed: bool,
    /// Automated trading enabled in the terminal
    pub expert_enabled: bool,
}
