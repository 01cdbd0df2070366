//! Shared fixtures: a scripted trading host, a settable clock, and a
//! harness wiring a dispatcher to an in-process bus

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use termlink_core::{
    AccountBalance, AccountFlags, AccountInfo, AccountMargin, Bar, BrokerInfo, Deal,
    IndicatorSpec, OutboundMessage, PendingOrder, Position, Tick, Timeframe, Timestamp,
    TradeAction, TradeOutcome, TradeRetcode, TradeTransaction,
};
use termlink_engine::{Dispatcher, DispatcherSettings};
use termlink_gateway::{Bus, BusClient, ChannelPorts, ChannelSubscriber, Subscriber};
use termlink_ports::{Clock, HostError, HostResult, TradingHost};
use tokio::sync::mpsc;

pub const EPOCH: Timestamp = 1_700_000_000;

pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::Relaxed);
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::Relaxed);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::Relaxed)
    }
}

/// Scripted trading host. Tests pre-load bars and indicator values and
/// inspect which actions were executed.
pub struct MockHost {
    bars: Mutex<HashMap<(String, Timeframe), Bar>>,
    indicators: Mutex<HashMap<(String, String, u32), Decimal>>,
    allowed: AtomicBool,
    outcome: Mutex<TradeOutcome>,
    executed: Mutex<Vec<TradeAction>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            bars: Mutex::new(HashMap::new()),
            indicators: Mutex::new(HashMap::new()),
            allowed: AtomicBool::new(true),
            outcome: Mutex::new(TradeOutcome {
                retcode: TradeRetcode::Done,
                order: 1001,
                deal: 2001,
                price: dec!(1.1000),
                volume: dec!(0.10),
                comment: "done".into(),
            }),
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn set_bar(&self, symbol: &str, timeframe: Timeframe, bar: Bar) {
        self.bars
            .lock()
            .unwrap()
            .insert((symbol.to_string(), timeframe), bar);
    }

    pub fn set_indicator(&self, symbol: &str, kind: &str, period: u32, value: Decimal) {
        self.indicators
            .lock()
            .unwrap()
            .insert((symbol.to_string(), kind.to_string(), period), value);
    }

    pub fn set_allowed(&self, allowed: bool) {
        self.allowed.store(allowed, Ordering::Relaxed);
    }

    pub fn set_outcome(&self, outcome: TradeOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn executed(&self) -> Vec<TradeAction> {
        self.executed.lock().unwrap().clone()
    }
}

impl TradingHost for MockHost {
    fn broker_info(&self) -> HostResult<BrokerInfo> {
        Ok(BrokerInfo {
            company: "Mock Broker Ltd".into(),
            server: "Mock-Demo".into(),
        })
    }

    fn account_info(&self) -> HostResult<AccountInfo> {
        Ok(AccountInfo {
            login: 7_654_321,
            name: "Test Account".into(),
            currency: "USD".into(),
        })
    }

    fn account_balance(&self) -> HostResult<AccountBalance> {
        Ok(AccountBalance {
            balance: dec!(10000.00),
            equity: dec!(10123.45),
            currency: "USD".into(),
        })
    }

    fn account_leverage(&self) -> HostResult<i64> {
        Ok(100)
    }

    fn account_flags(&self) -> HostResult<AccountFlags> {
        Ok(AccountFlags {
            trade_allowed: self.allowed.load(Ordering::Relaxed),
            expert_enabled: true,
        })
    }

    fn account_margin(&self) -> HostResult<AccountMargin> {
        Ok(AccountMargin {
            margin: dec!(250.00),
            free_margin: dec!(9873.45),
            margin_level: dec!(4049.38),
        })
    }

    fn account_state(&self) -> HostResult<String> {
        Ok("DEMO".into())
    }

    fn server_time(&self) -> HostResult<Timestamp> {
        Ok(EPOCH)
    }

    fn trade_allowed(&self) -> bool {
        self.allowed.load(Ordering::Relaxed)
    }

    fn positions(&self) -> HostResult<Vec<Position>> {
        Ok(Vec::new())
    }

    fn orders(&self) -> HostResult<Vec<PendingOrder>> {
        Ok(Vec::new())
    }

    fn history_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        _from: Timestamp,
        _to: Timestamp,
    ) -> HostResult<Vec<Bar>> {
        self.latest_bar(symbol, timeframe).map(|bar| vec![bar])
    }

    fn history_deals(&self, _from: Timestamp, _to: Timestamp) -> HostResult<Vec<Deal>> {
        Ok(Vec::new())
    }

    fn latest_bar(&self, symbol: &str, timeframe: Timeframe) -> HostResult<Bar> {
        self.bars
            .lock()
            .unwrap()
            .get(&(symbol.to_string(), timeframe))
            .cloned()
            .ok_or_else(|| HostError::NoData {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
            })
    }

    fn tick(&self, symbol: &str) -> HostResult<Tick> {
        let bar = self.latest_bar(symbol, Timeframe::M1)?;
        Ok(Tick {
            time: bar.time,
            bid: bar.close,
            ask: bar.close + dec!(0.0002),
            last: bar.close,
            volume: 1,
        })
    }

    fn indicator_value(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        spec: &IndicatorSpec,
    ) -> HostResult<Decimal> {
        self.indicators
            .lock()
            .unwrap()
            .get(&(symbol.to_string(), spec.kind.clone(), spec.period))
            .copied()
            .ok_or_else(|| HostError::UnsupportedIndicator(spec.kind.clone()))
    }

    fn execute(&self, action: TradeAction) -> HostResult<TradeOutcome> {
        self.executed.lock().unwrap().push(action);
        Ok(self.outcome.lock().unwrap().clone())
    }
}

/// Shared handle to a [`MockHost`]; forwards every call (orphan rule
/// prevents implementing the trait on `Arc<MockHost>` directly)
pub struct SharedHost(pub Arc<MockHost>);

impl TradingHost for SharedHost {
    fn broker_info(&self) -> HostResult<BrokerInfo> {
        self.0.broker_info()
    }

    fn account_info(&self) -> HostResult<AccountInfo> {
        self.0.account_info()
    }

    fn account_balance(&self) -> HostResult<AccountBalance> {
        self.0.account_balance()
    }

    fn account_leverage(&self) -> HostResult<i64> {
        self.0.account_leverage()
    }

    fn account_flags(&self) -> HostResult<AccountFlags> {
        self.0.account_flags()
    }

    fn account_margin(&self) -> HostResult<AccountMargin> {
        self.0.account_margin()
    }

    fn account_state(&self) -> HostResult<String> {
        self.0.account_state()
    }

    fn server_time(&self) -> HostResult<Timestamp> {
        self.0.server_time()
    }

    fn trade_allowed(&self) -> bool {
        self.0.trade_allowed()
    }

    fn positions(&self) -> HostResult<Vec<Position>> {
        self.0.positions()
    }

    fn orders(&self) -> HostResult<Vec<PendingOrder>> {
        self.0.orders()
    }

    fn history_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from: Timestamp,
        to: Timestamp,
    ) -> HostResult<Vec<Bar>> {
        self.0.history_bars(symbol, timeframe, from, to)
    }

    fn history_deals(&self, from: Timestamp, to: Timestamp) -> HostResult<Vec<Deal>> {
        self.0.history_deals(from, to)
    }

    fn latest_bar(&self, symbol: &str, timeframe: Timeframe) -> HostResult<Bar> {
        self.0.latest_bar(symbol, timeframe)
    }

    fn tick(&self, symbol: &str) -> HostResult<Tick> {
        self.0.tick(symbol)
    }

    fn indicator_value(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        spec: &IndicatorSpec,
    ) -> HostResult<Decimal> {
        self.0.indicator_value(symbol, timeframe, spec)
    }

    fn execute(&self, action: TradeAction) -> HostResult<TradeOutcome> {
        self.0.execute(action)
    }
}

pub fn bar(time: Timestamp, close: Decimal) -> Bar {
    Bar {
        time,
        open: close - dec!(0.0010),
        high: close + dec!(0.0005),
        low: close - dec!(0.0015),
        close,
        tick_volume: 42,
    }
}

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub client: BusClient,
    pub host: Arc<MockHost>,
    pub clock: Arc<FixedClock>,
    pub trades: mpsc::Sender<TradeTransaction>,
}

/// Connected dispatcher on an in-process bus, with the REGISTER
/// announcement already drained
pub async fn harness() -> Harness {
    let mut h = idle_harness();
    h.dispatcher.connect().await;
    let startup = drain(&mut h.client.admin.rx);
    assert_eq!(startup.len(), 1);
    assert_eq!(startup[0].event.as_deref(), Some("REGISTER"));
    h
}

/// Dispatcher wired but not yet registered
pub fn idle_harness() -> Harness {
    let ports = ChannelPorts {
        admin: 15555,
        data: 15556,
        trade: 15557,
        live: 15558,
        events: 15559,
    };
    let (bus, client) = Bus::in_process(ports, 64).unwrap();
    let host = Arc::new(MockHost::new());
    let clock = Arc::new(FixedClock::new(EPOCH));
    let (trades, transactions) = mpsc::channel(16);
    let settings = DispatcherSettings {
        broker_key: "test-broker".into(),
        tick: Duration::from_millis(250),
        heartbeat: Duration::from_secs(10),
    };
    let dispatcher = Dispatcher::new(
        bus,
        Box::new(SharedHost(host.clone())),
        clock.clone(),
        transactions,
        settings,
    );
    Harness {
        dispatcher,
        client,
        host,
        clock,
        trades,
    }
}

pub fn frame(command: &str, request_id: &str, payload: Value) -> String {
    json!({
        "command": command,
        "request_id": request_id,
        "payload": payload,
    })
    .to_string()
}

/// Pull every buffered envelope off a client-side subscriber
pub fn drain(rx: &mut ChannelSubscriber) -> Vec<OutboundMessage> {
    let mut out = Vec::new();
    while let Ok(Some(raw)) = rx.try_next() {
        let value = serde_json::from_str(&raw).unwrap();
        out.push(OutboundMessage::from_value(value).unwrap());
    }
    out
}

pub fn with_event<'a>(
    msgs: &'a [OutboundMessage],
    event: &str,
) -> Vec<&'a OutboundMessage> {
    msgs.iter()
        .filter(|m| m.event.as_deref() == Some(event))
        .collect()
}
