//! The per-tick dispatcher
//!
//! One logical task owns the bus, the router, and the subscription
//! list. Each tick runs a fixed sequence:
//!
//! 1. drain every inbound channel to exhaustion, dispatching each
//!    message synchronously and replying on the right channel
//! 2. compact tombstoned subscriptions
//! 3. run one subscription poll pass and emit fresh updates
//! 4. drain trade transaction notifications through the event emitter
//! 5. periodic duties: trade-allowed watch and heartbeat
//!
//! Handlers block the tick until the host call returns; host calls are
//! assumed fast and synchronous. There is no timeout of a stuck call.

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use serde_json::json;
use termlink_core::{Timestamp, TradeTransaction};
use termlink_gateway::{Bus, Subscriber, codec};
use termlink_ports::{Clock, TradingHost};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{MissedTickBehavior, interval};

use crate::events;
use crate::outbound::ResponseBuilder;
use crate::router::{DispatchCtx, RouteReply, Router};
use crate::subscriptions::SubscriptionManager;

/// Bridge lifecycle. Envelopes only leave the bridge while `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Connected,
    Stopped,
}

/// Dispatcher timing and identity
#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    pub broker_key: String,
    pub tick: Duration,
    pub heartbeat: Duration,
}

/// Which inbound channel a frame arrived on; decides where the reply
/// goes. Trade commands are answered on the publish-only live channel.
#[derive(Clone, Copy)]
enum Source {
    Admin,
    Data,
    Trade,
}

pub struct Dispatcher {
    bus: Bus,
    router: Router,
    subs: SubscriptionManager,
    builder: ResponseBuilder,
    host: Box<dyn TradingHost>,
    clock: Arc<dyn Clock>,
    transactions: mpsc::Receiver<TradeTransaction>,
    settings: DispatcherSettings,
    state: Lifecycle,
    last_trade_allowed: Option<bool>,
    next_heartbeat: Timestamp,
}

impl Dispatcher {
    pub fn new(
        bus: Bus,
        host: Box<dyn TradingHost>,
        clock: Arc<dyn Clock>,
        transactions: mpsc::Receiver<TradeTransaction>,
        settings: DispatcherSettings,
    ) -> Self {
        let builder = ResponseBuilder::new(settings.broker_key.clone(), clock.clone());
        Self {
            bus,
            router: Router::new(),
            subs: SubscriptionManager::new(),
            builder,
            host,
            clock,
            transactions,
            settings,
            state: Lifecycle::Idle,
            last_trade_allowed: None,
            next_heartbeat: 0,
        }
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subs
    }

    /// Enter the connected state and announce the bridge on the admin
    /// channel
    pub async fn connect(&mut self) {
        self.state = Lifecycle::Connected;
        self.next_heartbeat = self.clock.now() + self.settings.heartbeat.as_secs() as i64;
        let msg = self.builder.system("REGISTER");
        if self.send(Source::Admin, &msg).await {
            info!("registered as '{}'", self.builder.broker_key());
        }
    }

    /// Announce shutdown and stop sending
    pub async fn disconnect(&mut self) {
        let msg = self.builder.system("UNREGISTER");
        let _ = self.send(Source::Admin, &msg).await;
        self.state = Lifecycle::Stopped;
        info!("unregistered '{}'", self.builder.broker_key());
    }

    /// Run until the shutdown signal fires
    pub async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        self.connect().await;
        let mut ticker = interval(self.settings.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                _ = &mut shutdown => break,
            }
        }
        self.disconnect().await;
    }

    /// One full tick. Public so tests can drive the dispatcher
    /// deterministically without the timer.
    pub async fn tick(&mut self) {
        self.drain(Source::Admin).await;
        self.drain(Source::Data).await;
        self.drain(Source::Trade).await;

        // Removals issued by the commands above become visible here,
        // strictly before the poll enumerates the list
        self.subs.compact();

        if !self.subs.is_empty() {
            self.poll_subscriptions().await;
        }

        self.drain_transactions().await;
        self.watch_trade_allowed().await;
        self.heartbeat().await;
    }

    async fn drain(&mut self, source: Source) {
        loop {
            let queue = match source {
                Source::Admin => &mut self.bus.admin.rx,
                Source::Data => &mut self.bus.data.rx,
                Source::Trade => &mut self.bus.trade.rx,
            };
            let frame = match queue.try_next() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    warn!("inbound channel error: {e}");
                    break;
                }
            };
            self.handle_frame(source, frame).await;
        }
    }

    async fn handle_frame(&mut self, source: Source, frame: String) {
        let raw = match codec::decode(&frame) {
            Ok(raw) => raw,
            Err(e) => {
                // No request_id is recoverable: log and drop silently
                warn!("{e}");
                return;
            }
        };

        let reply = {
            let mut ctx = DispatchCtx {
                host: self.host.as_ref(),
                subs: &mut self.subs,
                clock: self.clock.as_ref(),
            };
            self.router.dispatch(&mut ctx, &raw)
        };

        let msg = match reply {
            RouteReply::Ok { request_id, fields } => self.builder.ok(&request_id, fields),
            RouteReply::Error { request_id, message } => {
                self.builder.error(&request_id, &message)
            }
        };
        let _ = self.send(source, &msg).await;
    }

    async fn poll_subscriptions(&mut self) {
        let updates = self.subs.collect(self.host.as_ref());

        if let Some(grouped) = updates.grouped {
            match serde_json::to_value(&grouped.entries) {
                Ok(data) => {
                    let msg = self
                        .builder
                        .stream("OHLC_INDICATOR_UPDATE")
                        .with_request_id(&grouped.request_id)
                        .with_field("data", data);
                    if self.send_live(&msg).await {
                        self.subs.commit_grouped(&grouped);
                    }
                }
                Err(e) => warn!("combined update serialization failed: {e}"),
            }
        }

        for single in updates.singles {
            match serde_json::to_value(&single.bar) {
                Ok(ohlc) => {
                    let msg = self
                        .builder
                        .stream("OHLC_UPDATE")
                        .with_request_id(&single.request_id)
                        .with_field("symbol", json!(single.symbol))
                        .with_field("timeframe", json!(single.timeframe))
                        .with_field("ohlc", ohlc);
                    if self.send_live(&msg).await {
                        self.subs.commit_single(&single);
                    }
                }
                Err(e) => warn!("update serialization failed: {e}"),
            }
        }
    }

    async fn drain_transactions(&mut self) {
        while let Ok(tx) = self.transactions.try_recv() {
            if let Some(fields) = events::convert(&tx) {
                let msg = self.builder.stream("TRADE_EVENT").with_fields(fields);
                if !matches!(self.state, Lifecycle::Connected) {
                    warn!("dropping trade event: bridge not connected");
                    continue;
                }
                let _ = self.builder.send(&self.bus.events.tx, &msg).await;
            }
        }
    }

    async fn watch_trade_allowed(&mut self) {
        let allowed = self.host.trade_allowed();
        if self.last_trade_allowed == Some(allowed) {
            return;
        }
        let msg = self
            .builder
            .stream("TRADE_ALLOWED_UPDATE")
            .with_field("trade_allowed", json!(allowed));
        if self.send_live(&msg).await {
            self.last_trade_allowed = Some(allowed);
        }
    }

    async fn heartbeat(&mut self) {
        let now = self.clock.now();
        if now < self.next_heartbeat {
            return;
        }
        let msg = self.builder.system("HEARTBEAT");
        let _ = self.send_live(&msg).await;
        self.next_heartbeat = now + self.settings.heartbeat.as_secs() as i64;
    }

    async fn send(&self, source: Source, msg: &termlink_core::OutboundMessage) -> bool {
        if !matches!(self.state, Lifecycle::Connected) {
            warn!("dropping outbound envelope: bridge not connected");
            return false;
        }
        let publisher = match source {
            Source::Admin => &self.bus.admin.tx,
            Source::Data => &self.bus.data.tx,
            Source::Trade => &self.bus.live.tx,
        };
        self.builder.send(publisher, msg).await
    }

    async fn send_live(&self, msg: &termlink_core::OutboundMessage) -> bool {
        if !matches!(self.state, Lifecycle::Connected) {
            warn!("dropping outbound envelope: bridge not connected");
            return false;
        }
        self.builder.send(&self.bus.live.tx, msg).await
    }
}
