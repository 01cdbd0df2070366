//! Tokio channel-based transport for single-process mode
//!
//! Bridge-to-client direction uses broadcast channels so several
//! observers can attach to one outbound channel. Client-to-bridge
//! direction uses mpsc: command channels have exactly one consumer,
//! the dispatcher.

use crate::error::TransportError;
use crate::transport::{Publisher, Subscriber};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::{broadcast, mpsc};

/// Broadcast publisher (bridge-to-client direction)
pub struct ChannelPublisher {
    tx: broadcast::Sender<String>,
    // Keeps the channel writable before any client attaches
    _keepalive: Mutex<broadcast::Receiver<String>>,
}

impl ChannelPublisher {
    /// Create a publisher/subscriber pair with given capacity
    pub fn pair(capacity: usize) -> (Self, ChannelSubscriber) {
        let (tx, rx) = broadcast::channel(capacity);
        let keepalive = tx.subscribe();
        (
            Self {
                tx,
                _keepalive: Mutex::new(keepalive),
            },
            ChannelSubscriber::new(rx),
        )
    }

    /// Attach another subscriber to this channel
    pub fn subscribe(&self) -> ChannelSubscriber {
        ChannelSubscriber::new(self.tx.subscribe())
    }
}

#[async_trait]
impl Publisher for ChannelPublisher {
    async fn publish(&self, frame: &str) -> Result<(), TransportError> {
        self.tx
            .send(frame.to_string())
            .map(|_| ())
            .map_err(|_| TransportError::ChannelClosed)
    }
}

/// Broadcast subscriber (client side of an outbound channel)
pub struct ChannelSubscriber {
    rx: broadcast::Receiver<String>,
}

impl ChannelSubscriber {
    pub fn new(rx: broadcast::Receiver<String>) -> Self {
        Self { rx }
    }
}

#[async_trait]
impl Subscriber for ChannelSubscriber {
    async fn next(&mut self) -> Result<String, TransportError> {
        loop {
            match self.rx.recv().await {
                Ok(frame) => return Ok(frame),
                // Skip lagged frames and continue
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(TransportError::ChannelClosed);
                }
            }
        }
    }

    fn try_next(&mut self) -> Result<Option<String>, TransportError> {
        match self.rx.try_recv() {
            Ok(frame) => Ok(Some(frame)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            // Return None on lag, caller can retry
            Err(broadcast::error::TryRecvError::Lagged(_)) => Ok(None),
            Err(broadcast::error::TryRecvError::Closed) => Err(TransportError::ChannelClosed),
        }
    }
}

/// Client-side sender for an inbound command channel
#[derive(Clone)]
pub struct InboundSender {
    tx: mpsc::Sender<String>,
}

#[async_trait]
impl Publisher for InboundSender {
    async fn publish(&self, frame: &str) -> Result<(), TransportError> {
        self.tx
            .send(frame.to_string())
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}

/// Dispatcher-side queue for an inbound command channel
pub struct InboundQueue {
    rx: mpsc::Receiver<String>,
}

impl InboundQueue {
    /// Create a sender/queue pair with given capacity
    pub fn pair(capacity: usize) -> (InboundSender, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (InboundSender { tx }, Self { rx })
    }
}

#[async_trait]
impl Subscriber for InboundQueue {
    async fn next(&mut self) -> Result<String, TransportError> {
        self.rx.recv().await.ok_or(TransportError::ChannelClosed)
    }

    fn try_next(&mut self) -> Result<Option<String>, TransportError> {
        match self.rx.try_recv() {
            Ok(frame) => Ok(Some(frame)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(TransportError::ChannelClosed),
        }
    }
}
