//! Process wiring: config to running bridge

use std::sync::Arc;
use std::time::Duration;

use termlink_engine::{Dispatcher, DispatcherSettings};
use termlink_gateway::{Bus, BusClient, TransportError};
use termlink_ports::Clock;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::BridgeConfig;
use crate::sim_host::{SimulatedHost, SystemClock};

const BUS_CAPACITY: usize = 256;
const TRANSACTION_CAPACITY: usize = 64;

/// A running bridge task plus the client side of its bus
pub struct Bridge {
    pub client: BusClient,
    pub shutdown: oneshot::Sender<()>,
    pub handle: JoinHandle<()>,
}

/// Wire the bus, host, and dispatcher from a validated config and
/// spawn the dispatcher loop. Must run inside a tokio runtime.
pub fn start(config: &BridgeConfig) -> Result<Bridge, TransportError> {
    let (bus, client) = Bus::in_process(config.channel_ports(), BUS_CAPACITY)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (transactions_tx, transactions_rx) = mpsc::channel(TRANSACTION_CAPACITY);
    let host = SimulatedHost::new(clock.clone(), transactions_tx);

    let settings = DispatcherSettings {
        broker_key: config.broker_key.clone(),
        tick: Duration::from_millis(config.timing.tick_ms),
        heartbeat: Duration::from_secs(config.timing.heartbeat_secs),
    };
    let dispatcher = Dispatcher::new(bus, Box::new(host), clock, transactions_rx, settings);

    let (shutdown, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(dispatcher.run(shutdown_rx));
    Ok(Bridge {
        client,
        shutdown,
        handle,
    })
}
