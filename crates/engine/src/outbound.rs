//! Response builder and outbound send path
//!
//! Single entry point for success and error envelopes. The builder
//! stamps the tenant `broker_key` and the clock's timestamp on every
//! message; handlers never touch either. Send failures are reported to
//! callers as a boolean and logged, with no further escalation.

use std::sync::Arc;

use log::warn;
use serde_json::{Map, Value};
use termlink_core::{MessageKind, OutboundMessage, Status};
use termlink_gateway::{Publisher, codec};
use termlink_ports::Clock;

pub struct ResponseBuilder {
    broker_key: String,
    clock: Arc<dyn Clock>,
}

impl ResponseBuilder {
    pub fn new(broker_key: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            broker_key: broker_key.into(),
            clock,
        }
    }

    pub fn broker_key(&self) -> &str {
        &self.broker_key
    }

    fn stamped(&self, kind: MessageKind) -> OutboundMessage {
        let mut msg = OutboundMessage::new(kind);
        msg.broker_key = self.broker_key.clone();
        msg.timestamp = self.clock.now();
        msg
    }

    /// Success response with handler-supplied fields
    pub fn ok(&self, request_id: &str, fields: Map<String, Value>) -> OutboundMessage {
        self.stamped(MessageKind::Response)
            .with_request_id(request_id)
            .with_status(Status::Ok)
            .with_fields(fields)
    }

    /// Error response with the fixed diagnostic field
    pub fn error(&self, request_id: &str, message: &str) -> OutboundMessage {
        self.stamped(MessageKind::Response)
            .with_request_id(request_id)
            .with_status(Status::Error)
            .with_field("error_message", Value::String(message.to_string()))
    }

    /// Stream envelope carrying the given event name
    pub fn stream(&self, event: &str) -> OutboundMessage {
        self.stamped(MessageKind::Stream).with_event(event)
    }

    /// System envelope (lifecycle, heartbeat)
    pub fn system(&self, event: &str) -> OutboundMessage {
        self.stamped(MessageKind::System).with_event(event)
    }

    /// Encode and publish. `false` means the frame did not leave the
    /// bridge; the caller decides whether that matters.
    pub async fn send(&self, publisher: &dyn Publisher, msg: &OutboundMessage) -> bool {
        let frame = codec::encode(msg);
        match publisher.publish(&frame).await {
            Ok(()) => true,
            Err(e) => {
                warn!("send failed: {e}");
                false
            }
        }
    }
}
