//! Wire envelope types
//!
//! Inbound commands arrive as a flat JSON object with `command`,
//! `request_id` and an optional `payload` mapping. Outbound envelopes
//! are flat objects carrying `type`, optional `event`/`request_id`/
//! `status`, the tenant `broker_key`, a `timestamp`, and any
//! command-specific fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::payload::Payload;

/// Kind of an outbound envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    System,
    Response,
    Stream,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::Response => "RESPONSE",
            Self::Stream => "STREAM",
        }
    }
}

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Error => "ERROR",
        }
    }
}

/// Inbound envelope as decoded from the wire, before any validation.
///
/// All fields are optional here; the router decides how to answer when
/// `command` or `request_id` is missing. Unknown top-level keys are
/// ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInbound {
    pub command: Option<String>,
    pub request_id: Option<String>,
    pub payload: Option<Map<String, Value>>,
}

impl RawInbound {
    /// Payload accessor, defaulting to an empty mapping when absent
    pub fn payload(&self) -> Payload {
        Payload::new(self.payload.clone().unwrap_or_default())
    }
}

/// Outbound envelope prior to encoding.
///
/// `broker_key` and `timestamp` are stamped by the response builder,
/// never by handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub kind: MessageKind,
    /// Event name for STREAM/SYSTEM envelopes (`OHLC_UPDATE`, ...)
    pub event: Option<String>,
    pub request_id: Option<String>,
    pub status: Option<Status>,
    pub broker_key: String,
    pub timestamp: i64,
    /// Command-specific fields, flattened into the envelope
    pub fields: Map<String, Value>,
}

impl OutboundMessage {
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            event: None,
            request_id: None,
            status: None,
            broker_key: String::new(),
            timestamp: 0,
            fields: Map::new(),
        }
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach a command-specific field. Values failing to serialize are
    /// unrepresentable here because callers pass already-built values.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_fields(mut self, fields: Map<String, Value>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Assemble the flat JSON object. Reserved envelope keys always win
    /// over handler-supplied fields of the same name.
    pub fn to_value(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert("type".into(), Value::String(self.kind.as_str().into()));
        if let Some(event) = &self.event {
            map.insert("event".into(), Value::String(event.clone()));
        }
        if let Some(request_id) = &self.request_id {
            map.insert("request_id".into(), Value::String(request_id.clone()));
        }
        if let Some(status) = self.status {
            map.insert("status".into(), Value::String(status.as_str().into()));
        }
        map.insert("broker_key".into(), Value::String(self.broker_key.clone()));
        map.insert("timestamp".into(), Value::Number(self.timestamp.into()));
        Value::Object(map)
    }

    /// Rebuild an envelope from its flat JSON form. Used by tests and
    /// by in-process consumers of the live/event channels.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut map) = value else {
            return None;
        };
        let kind = match map.remove("type")?.as_str()? {
            "SYSTEM" => MessageKind::System,
            "RESPONSE" => MessageKind::Response,
            "STREAM" => MessageKind::Stream,
            _ => return None,
        };
        let event = map
            .remove("event")
            .and_then(|v| v.as_str().map(str::to_string));
        let request_id = map
            .remove("request_id")
            .and_then(|v| v.as_str().map(str::to_string));
        let status = match map.remove("status").as_ref().and_then(Value::as_str) {
            Some("OK") => Some(Status::Ok),
            Some("ERROR") => Some(Status::Error),
            _ => None,
        };
        let broker_key = map
            .remove("broker_key")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let timestamp = map
            .remove("timestamp")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        Some(Self {
            kind,
            event,
            request_id,
            status,
            broker_key,
            timestamp,
            fields: map,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outbound_value_carries_reserved_keys() {
        let msg = OutboundMessage::new(MessageKind::Response)
            .with_request_id("r1")
            .with_status(Status::Ok)
            .with_field("balance", json!("1000.50"));
        let value = msg.to_value();
        assert_eq!(value["type"], "RESPONSE");
        assert_eq!(value["request_id"], "r1");
        assert_eq!(value["status"], "OK");
        assert_eq!(value["balance"], "1000.50");
    }

    #[test]
    fn reserved_keys_win_over_handler_fields() {
        let msg = OutboundMessage::new(MessageKind::Stream)
            .with_event("OHLC_UPDATE")
            .with_field("type", json!("bogus"));
        assert_eq!(msg.to_value()["type"], "STREAM");
    }

    #[test]
    fn from_value_round_trips() {
        let mut msg = OutboundMessage::new(MessageKind::Stream)
            .with_event("TRADE_EVENT")
            .with_request_id("r9")
            .with_field("retcode", json!("DONE"));
        msg.broker_key = "demo".into();
        msg.timestamp = 1_700_000_000;
        let back = OutboundMessage::from_value(msg.to_value()).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn raw_inbound_ignores_unknown_keys() {
        let raw: RawInbound = serde_json::from_value(json!({
            "command": "PING",
            "request_id": "r1",
            "extra": 1
        }))
        .unwrap();
        assert_eq!(raw.command.as_deref(), Some("PING"));
        assert!(raw.payload.is_none());
        assert_eq!(raw.payload().str_field("anything"), "");
    }
}
