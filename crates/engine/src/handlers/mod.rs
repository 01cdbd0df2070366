//! Handler shims for the command surface
//!
//! Each handler is a thin field-extraction-and-call wrapper around the
//! trading host or the subscription manager. Envelope mechanics
//! (status, request_id, broker_key, timestamp) belong to the router
//! and response builder, never to a handler.

mod account;
mod market;
mod stream;
mod trade;

use std::collections::HashMap;

use serde_json::{Map, Value};
use termlink_core::{Payload, Timeframe};

use crate::error::CommandError;
use crate::router::Handler;

pub(crate) type Table = HashMap<&'static str, Handler>;

/// Register the full command surface
pub fn register_all(table: &mut Table) {
    account::register(table);
    market::register(table);
    trade::register(table);
    stream::register(table);
}

/// Convert a `json!` object literal into response fields
pub(crate) fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub(crate) fn required_str<'a>(
    payload: &'a Payload,
    key: &'static str,
) -> Result<&'a str, CommandError> {
    payload
        .non_empty_str(key)
        .ok_or_else(|| CommandError::validation(format!("Missing required field: {key}")))
}

pub(crate) fn required_timeframe(payload: &Payload) -> Result<Timeframe, CommandError> {
    let raw = required_str(payload, "timeframe")?;
    Timeframe::parse(raw)
        .ok_or_else(|| CommandError::validation(format!("Invalid timeframe: {raw}")))
}

pub(crate) fn required_ticket(payload: &Payload) -> Result<i64, CommandError> {
    let ticket = payload.i64_field("ticket");
    if ticket <= 0 {
        return Err(CommandError::validation("Missing required field: ticket"));
    }
    Ok(ticket)
}
