//! The five-channel message bus
//!
//! Channel roles mirror the external contract:
//! - `admin`  - request/response, administrative commands
//! - `data`   - request/response, market-data commands
//! - `trade`  - inbound only, trade commands
//! - `live`   - publish only, trade responses and stream updates
//! - `events` - publish only, raw execution-event notifications
//!
//! Each channel is bound to one externally configured port; ports must
//! be pairwise distinct or startup fails.

use log::info;

use crate::error::TransportError;
use crate::transport::channel::{ChannelPublisher, ChannelSubscriber, InboundQueue, InboundSender};

/// Port assignment for the five channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelPorts {
    pub admin: u16,
    pub data: u16,
    pub trade: u16,
    pub live: u16,
    pub events: u16,
}

impl ChannelPorts {
    fn named(&self) -> [(&'static str, u16); 5] {
        [
            ("admin", self.admin),
            ("data", self.data),
            ("trade", self.trade),
            ("live", self.live),
            ("events", self.events),
        ]
    }

    /// Reject zero ports and any port assigned to two channels
    pub fn validate(&self) -> Result<(), TransportError> {
        let named = self.named();
        for (i, &(_, port)) in named.iter().enumerate() {
            if port == 0 {
                return Err(TransportError::InvalidPort(port));
            }
            if named[..i].iter().any(|&(_, other)| other == port) {
                return Err(TransportError::PortCollision(port));
            }
        }
        Ok(())
    }
}

/// Request/response channel (dispatcher side)
pub struct CommandChannel {
    pub name: &'static str,
    pub port: u16,
    pub rx: InboundQueue,
    pub tx: ChannelPublisher,
}

/// Inbound-only channel (dispatcher side)
pub struct IngressChannel {
    pub name: &'static str,
    pub port: u16,
    pub rx: InboundQueue,
}

/// Publish-only channel (dispatcher side)
pub struct EgressChannel {
    pub name: &'static str,
    pub port: u16,
    pub tx: ChannelPublisher,
}

/// Dispatcher side of the bus
pub struct Bus {
    pub admin: CommandChannel,
    pub data: CommandChannel,
    pub trade: IngressChannel,
    pub live: EgressChannel,
    pub events: EgressChannel,
}

/// Client side of a request/response channel
pub struct ClientEnd {
    pub tx: InboundSender,
    pub rx: ChannelSubscriber,
}

/// Client side of the bus, handed to the control process (or tests)
pub struct BusClient {
    pub admin: ClientEnd,
    pub data: ClientEnd,
    pub trade: InboundSender,
    pub live: ChannelSubscriber,
    pub events: ChannelSubscriber,
}

impl Bus {
    /// Build the in-process bus over tokio channels. Ports are not
    /// bound to sockets here, but the assignment is validated and
    /// logged exactly as a socket transport would.
    pub fn in_process(
        ports: ChannelPorts,
        capacity: usize,
    ) -> Result<(Bus, BusClient), TransportError> {
        ports.validate()?;

        let (admin_tx, admin_rx) = InboundQueue::pair(capacity);
        let (admin_pub, admin_sub) = ChannelPublisher::pair(capacity);
        let (data_tx, data_rx) = InboundQueue::pair(capacity);
        let (data_pub, data_sub) = ChannelPublisher::pair(capacity);
        let (trade_tx, trade_rx) = InboundQueue::pair(capacity);
        let (live_pub, live_sub) = ChannelPublisher::pair(capacity);
        let (events_pub, events_sub) = ChannelPublisher::pair(capacity);

        for (name, port) in ports.named() {
            info!("channel '{name}' bound to port {port}");
        }

        let bus = Bus {
            admin: CommandChannel {
                name: "admin",
                port: ports.admin,
                rx: admin_rx,
                tx: admin_pub,
            },
            data: CommandChannel {
                name: "data",
                port: ports.data,
                rx: data_rx,
                tx: data_pub,
            },
            trade: IngressChannel {
                name: "trade",
                port: ports.trade,
                rx: trade_rx,
            },
            live: EgressChannel {
                name: "live",
                port: ports.live,
                tx: live_pub,
            },
            events: EgressChannel {
                name: "events",
                port: ports.events,
                tx: events_pub,
            },
        };

        let client = BusClient {
            admin: ClientEnd {
                tx: admin_tx,
                rx: admin_sub,
            },
            data: ClientEnd {
                tx: data_tx,
                rx: data_sub,
            },
            trade: trade_tx,
            live: live_sub,
            events: events_sub,
        };

        Ok((bus, client))
    }
}
