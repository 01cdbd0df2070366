//! Market data types: timeframes, bars, ticks, indicator specs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Epoch seconds as reported by the terminal
pub type Timestamp = i64;

/// Chart timeframe for bar data and streaming subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
    W1,
    MN1,
}

impl Timeframe {
    /// Parse the wire spelling (`"M1"`, `"H4"`, ...). Returns `None` for
    /// anything the terminal does not support.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "M1" => Some(Self::M1),
            "M5" => Some(Self::M5),
            "M15" => Some(Self::M15),
            "M30" => Some(Self::M30),
            "H1" => Some(Self::H1),
            "H4" => Some(Self::H4),
            "D1" => Some(Self::D1),
            "W1" => Some(Self::W1),
            "MN1" => Some(Self::MN1),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::M1 => "M1",
            Self::M5 => "M5",
            Self::M15 => "M15",
            Self::M30 => "M30",
            Self::H1 => "H1",
            Self::H4 => "H4",
            Self::D1 => "D1",
            Self::W1 => "W1",
            Self::MN1 => "MN1",
        }
    }

    /// Bar duration in seconds
    pub fn seconds(&self) -> i64 {
        match self {
            Self::M1 => 60,
            Self::M5 => 300,
            Self::M15 => 900,
            Self::M30 => 1_800,
            Self::H1 => 3_600,
            Self::H4 => 14_400,
            Self::D1 => 86_400,
            Self::W1 => 604_800,
            Self::MN1 => 2_592_000,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One OHLC candle for a symbol/timeframe pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time, epoch seconds
    pub time: Timestamp,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub tick_volume: i64,
}

/// Best bid/ask quote for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Quote time, epoch seconds
    pub time: Timestamp,
    pub bid: Decimal,
    pub ask: Decimal,
    pub last: Decimal,
    pub volume: i64,
}

/// Indicator attached to a streaming subscription. Immutable once
/// attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSpec {
    /// Indicator kind, e.g. `"MA"`
    pub kind: String,
    /// Lookback period in bars, strictly positive
    pub period: u32,
}

impl IndicatorSpec {
    /// Validate a (kind, period) pair from the wire. A blank kind or a
    /// non-positive period yields `None`.
    pub fn checked(kind: &str, period: i64) -> Option<Self> {
        if kind.trim().is_empty() || period <= 0 {
            return None;
        }
        Some(Self {
            kind: kind.to_string(),
            period: period as u32,
        })
    }
}
