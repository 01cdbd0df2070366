//! Command router
//!
//! Pure mapping from wire command name to handler shim. The router
//! holds no state across calls: every dispatch gets a fresh context
//! borrowing the host, the subscription manager, and the clock.

use std::collections::HashMap;

use log::debug;
use serde_json::{Map, Value};
use termlink_core::{Payload, RawInbound};
use termlink_ports::{Clock, TradingHost};

use crate::error::CommandError;
use crate::handlers;
use crate::subscriptions::SubscriptionManager;

/// Diagnostic used when `command` or `request_id` is absent. The reply
/// carries an empty request_id because none was recoverable.
pub const MALFORMED_COMMAND: &str = "Malformed command: missing command or request_id";

/// Per-dispatch borrow of the engine's collaborators
pub struct DispatchCtx<'a> {
    pub host: &'a dyn TradingHost,
    pub subs: &'a mut SubscriptionManager,
    pub clock: &'a dyn Clock,
}

/// Decoded command with its payload defaulted to an empty mapping
pub struct Request {
    pub request_id: String,
    pub payload: Payload,
}

/// Handler shim: extracts payload fields, calls the host or the
/// subscription manager, returns response fields
pub type Handler = for<'a> fn(&mut DispatchCtx<'a>, &Request) -> Result<Map<String, Value>, CommandError>;

/// Outcome of routing one inbound message
#[derive(Debug)]
pub enum RouteReply {
    Ok {
        request_id: String,
        fields: Map<String, Value>,
    },
    Error {
        /// Echoed when known, empty otherwise
        request_id: String,
        message: String,
    },
}

pub struct Router {
    table: HashMap<&'static str, Handler>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Build the full command table
    pub fn new() -> Self {
        let mut table = HashMap::new();
        handlers::register_all(&mut table);
        Self { table }
    }

    /// Number of registered commands
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Route one decoded message. Always produces exactly one reply.
    pub fn dispatch(&self, ctx: &mut DispatchCtx<'_>, raw: &RawInbound) -> RouteReply {
        let (Some(command), Some(request_id)) = (&raw.command, &raw.request_id) else {
            return RouteReply::Error {
                request_id: String::new(),
                message: MALFORMED_COMMAND.to_string(),
            };
        };

        let Some(handler) = self.table.get(command.as_str()) else {
            return RouteReply::Error {
                request_id: request_id.clone(),
                message: format!("Unknown command: {command}"),
            };
        };

        debug!("dispatching {command} (request_id {request_id})");
        let request = Request {
            request_id: request_id.clone(),
            payload: raw.payload(),
        };
        match handler(ctx, &request) {
            Ok(fields) => RouteReply::Ok {
                request_id: request_id.clone(),
                fields,
            },
            Err(e) => RouteReply::Error {
                request_id: request_id.clone(),
                message: e.to_string(),
            },
        }
    }
}
