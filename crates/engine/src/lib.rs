//! Termlink Engine
//!
//! The protocol dispatcher and streaming-subscription engine:
//! - Command router mapping wire command names to handler shims
//! - Subscription manager owning the set of active streaming feeds
//! - Trade-event emitter with result-code filtering
//! - Response builder stamping tenant key and timestamps
//! - The per-tick dispatcher tying all of it to the bus
//!
//! Everything here runs on one logical task; the subscription list is
//! owned by the dispatcher and never shared.

pub mod dispatcher;
pub mod error;
pub mod events;
pub mod handlers;
pub mod outbound;
pub mod router;
pub mod subscriptions;

pub use dispatcher::{Dispatcher, DispatcherSettings, Lifecycle};
pub use error::CommandError;
pub use outbound::ResponseBuilder;
pub use router::{DispatchCtx, Request, RouteReply, Router};
pub use subscriptions::{StreamConfig, StreamError, Subscription, SubscriptionManager};
