//! Termlink Runner
//!
//! The bridge process: TOML configuration, a simulated terminal host
//! standing in for a live terminal adapter, and the bootstrap that
//! wires them to the dispatcher.

pub mod bootstrap;
pub mod config;
pub mod sim_host;

pub use bootstrap::{Bridge, start};
pub use config::{BridgeConfig, ConfigError};
pub use sim_host::{SimulatedHost, SystemClock};
