//! TOML configuration for the bridge process
//!
//! ```toml
//! broker_key = "broker-demo-1"
//!
//! [ports]
//! admin = 15555
//! data = 15556
//! trade = 15557
//! live = 15558
//! events = 15559
//!
//! [timing]
//! tick_ms = 250
//! heartbeat_secs = 10
//! ```

use std::path::Path;

use serde::Deserialize;
use termlink_gateway::{ChannelPorts, TransportError};
use thiserror::Error;

/// Lower and upper bound on the tick interval. Below the bound the
/// bridge would saturate a real terminal; above it streams go stale.
pub const TICK_MS_MIN: u64 = 50;
pub const TICK_MS_MAX: u64 = 5000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("broker_key must not be empty")]
    EmptyBrokerKey,

    #[error("Port assignment rejected: {0}")]
    Ports(#[from] TransportError),

    #[error("tick_ms must be within {TICK_MS_MIN}..={TICK_MS_MAX}, got {0}")]
    TickOutOfRange(u64),
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Tenant identifier stamped on every outbound envelope
    pub broker_key: String,
    pub ports: PortsConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortsConfig {
    pub admin: u16,
    pub data: u16,
    pub trade: u16,
    pub live: u16,
    pub events: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub tick_ms: u64,
    pub heartbeat_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 250,
            heartbeat_secs: 10,
        }
    }
}

impl BridgeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.broker_key.trim().is_empty() {
            return Err(ConfigError::EmptyBrokerKey);
        }
        self.channel_ports().validate()?;
        if !(TICK_MS_MIN..=TICK_MS_MAX).contains(&self.timing.tick_ms) {
            return Err(ConfigError::TickOutOfRange(self.timing.tick_ms));
        }
        Ok(())
    }

    pub fn channel_ports(&self) -> ChannelPorts {
        ChannelPorts {
            admin: self.ports.admin,
            data: self.ports.data,
            trade: self.ports.trade,
            live: self.ports.live,
            events: self.ports.events,
        }
    }
}
