//! Simulated terminal host
//!
//! Random-walk quotes and instant fills, good enough to exercise the
//! full bridge without a terminal attached. Every symbol springs into
//! existence at a deterministic seed price on first touch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use termlink_core::{
    AccountBalance, AccountFlags, AccountInfo, AccountMargin, Bar, BrokerInfo, Deal,
    IndicatorSpec, OrderKind, PendingOrder, Position, Tick, Timeframe, Timestamp, TradeAction,
    TradeOutcome, TradeRetcode, TradeTransaction,
};
use termlink_ports::{Clock, HostError, HostResult, TradingHost};
use tokio::sync::mpsc;

/// Wall clock, epoch seconds
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().timestamp()
    }
}

struct SimState {
    rng: StdRng,
    prices: HashMap<String, Decimal>,
    positions: Vec<Position>,
    orders: Vec<PendingOrder>,
    deals: Vec<Deal>,
    next_ticket: i64,
}

pub struct SimulatedHost {
    state: Mutex<SimState>,
    clock: Arc<dyn Clock>,
    transactions: mpsc::Sender<TradeTransaction>,
}

impl SimulatedHost {
    pub fn new(clock: Arc<dyn Clock>, transactions: mpsc::Sender<TradeTransaction>) -> Self {
        Self {
            state: Mutex::new(SimState {
                rng: StdRng::seed_from_u64(0x7e51),
                prices: HashMap::new(),
                positions: Vec::new(),
                orders: Vec::new(),
                deals: Vec::new(),
                next_ticket: 1000,
            }),
            clock,
            transactions,
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SimState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn notify(&self, transaction: TradeTransaction) {
        if let Err(e) = self.transactions.try_send(transaction) {
            warn!("transaction notification dropped: {e}");
        }
    }
}

impl SimState {
    /// Current quote, stepped by a small random walk on every read
    fn quote(&mut self, symbol: &str) -> Decimal {
        let seed = seed_price(symbol);
        let price = self.prices.entry(symbol.to_string()).or_insert(seed);
        let step = Decimal::new(self.rng.gen_range(-8..=8), 5);
        *price += step;
        if *price <= Decimal::ZERO {
            *price = seed;
        }
        *price
    }

    fn take_ticket(&mut self) -> i64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }
}

/// Stable per-symbol starting price so runs are comparable
fn seed_price(symbol: &str) -> Decimal {
    let hash = symbol
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    dec!(1.00000) + Decimal::new((hash % 90_000) as i64, 5)
}

impl TradingHost for SimulatedHost {
    fn broker_info(&self) -> HostResult<BrokerInfo> {
        Ok(BrokerInfo {
            company: "Termlink Simulation".into(),
            server: "Sim-Demo".into(),
        })
    }

    fn account_info(&self) -> HostResult<AccountInfo> {
        Ok(AccountInfo {
            login: 1_000_001,
            name: "Simulated Account".into(),
            currency: "USD".into(),
        })
    }

    fn account_balance(&self) -> HostResult<AccountBalance> {
        Ok(AccountBalance {
            balance: dec!(100000.00),
            equity: dec!(100000.00),
            currency: "USD".into(),
        })
    }

    fn account_leverage(&self) -> HostResult<i64> {
        Ok(100)
    }

    fn account_flags(&self) -> HostResult<AccountFlags> {
        Ok(AccountFlags {
            trade_allowed: true,
            expert_enabled: true,
        })
    }

    fn account_margin(&self) -> HostResult<AccountMargin> {
        Ok(AccountMargin {
            margin: Decimal::ZERO,
            free_margin: dec!(100000.00),
            margin_level: Decimal::ZERO,
        })
    }

    fn account_state(&self) -> HostResult<String> {
        Ok("DEMO".into())
    }

    fn server_time(&self) -> HostResult<Timestamp> {
        Ok(self.clock.now())
    }

    fn trade_allowed(&self) -> bool {
        true
    }

    fn positions(&self) -> HostResult<Vec<Position>> {
        Ok(self.state().positions.clone())
    }

    fn orders(&self) -> HostResult<Vec<PendingOrder>> {
        Ok(self.state().orders.clone())
    }

    fn history_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from: Timestamp,
        to: Timestamp,
    ) -> HostResult<Vec<Bar>> {
        let latest = self.latest_bar(symbol, timeframe)?;
        let span = timeframe.seconds();
        let end = if to > 0 { to.min(latest.time) } else { latest.time };
        let start = from.max(end - span * 99);
        let mut state = self.state();
        let mut bars = Vec::new();
        let mut time = start - start % span;
        while time <= end {
            let close = state.quote(symbol);
            bars.push(synth_bar(time, close));
            time += span;
        }
        Ok(bars)
    }

    fn history_deals(&self, from: Timestamp, to: Timestamp) -> HostResult<Vec<Deal>> {
        let deals = self
            .state()
            .deals
            .iter()
            .filter(|d| d.time >= from && (to == 0 || d.time <= to))
            .cloned()
            .collect();
        Ok(deals)
    }

    fn latest_bar(&self, symbol: &str, timeframe: Timeframe) -> HostResult<Bar> {
        let now = self.clock.now();
        let span = timeframe.seconds();
        let close = self.state().quote(symbol);
        Ok(synth_bar(now - now % span, close))
    }

    fn tick(&self, symbol: &str) -> HostResult<Tick> {
        let quote = self.state().quote(symbol);
        Ok(Tick {
            time: self.clock.now(),
            bid: quote,
            ask: quote + dec!(0.00020),
            last: quote,
            volume: 1,
        })
    }

    fn indicator_value(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        spec: &IndicatorSpec,
    ) -> HostResult<Decimal> {
        if spec.kind != "MA" && spec.kind != "EMA" {
            return Err(HostError::UnsupportedIndicator(spec.kind.clone()));
        }
        // Trail the quote a touch so the two lines separate in charts
        let quote = self.state().quote(symbol);
        Ok(quote - Decimal::new(spec.period as i64, 5))
    }

    fn execute(&self, action: TradeAction) -> HostResult<TradeOutcome> {
        let time = self.clock.now();
        let (symbol, kind, volume, price, outcome) = match action {
            TradeAction::Open {
                kind,
                symbol,
                volume,
                price,
                stop_loss,
                take_profit,
                comment,
            } => {
                let mut state = self.state();
                let fill = price.unwrap_or_else(|| state.quote(&symbol));
                let ticket = state.take_ticket();
                let retcode = if kind.is_pending() {
                    state.orders.push(PendingOrder {
                        ticket,
                        symbol: symbol.clone(),
                        kind,
                        volume,
                        price: fill,
                        stop_loss: stop_loss.unwrap_or_default(),
                        take_profit: take_profit.unwrap_or_default(),
                        placed_time: time,
                    });
                    TradeRetcode::Placed
                } else {
                    state.positions.push(Position {
                        ticket,
                        symbol: symbol.clone(),
                        kind,
                        volume,
                        open_price: fill,
                        current_price: fill,
                        stop_loss: stop_loss.unwrap_or_default(),
                        take_profit: take_profit.unwrap_or_default(),
                        profit: Decimal::ZERO,
                        open_time: time,
                    });
                    TradeRetcode::Done
                };
                let outcome = TradeOutcome {
                    retcode,
                    order: ticket,
                    deal: if kind.is_pending() { 0 } else { ticket },
                    price: fill,
                    volume,
                    comment,
                };
                (symbol, Some(kind), volume, fill, outcome)
            }
            TradeAction::ModifyPosition {
                ticket,
                stop_loss,
                take_profit,
            } => {
                let mut state = self.state();
                let position = state
                    .positions
                    .iter_mut()
                    .find(|p| p.ticket == ticket)
                    .ok_or(HostError::UnknownTicket(ticket))?;
                if let Some(sl) = stop_loss {
                    position.stop_loss = sl;
                }
                if let Some(tp) = take_profit {
                    position.take_profit = tp;
                }
                let (symbol, kind, volume, price) = (
                    position.symbol.clone(),
                    position.kind,
                    position.volume,
                    position.current_price,
                );
                let outcome = TradeOutcome {
                    retcode: TradeRetcode::Done,
                    order: ticket,
                    deal: 0,
                    price,
                    volume,
                    comment: "modified".into(),
                };
                (symbol, Some(kind), volume, price, outcome)
            }
            TradeAction::ClosePartial { ticket, volume } => {
                let mut state = self.state();
                let position = state
                    .positions
                    .iter_mut()
                    .find(|p| p.ticket == ticket)
                    .ok_or(HostError::UnknownTicket(ticket))?;
                if volume >= position.volume {
                    let position = position.clone();
                    drop(state);
                    return self.execute(TradeAction::CloseById {
                        ticket: position.ticket,
                    });
                }
                position.volume -= volume;
                let (symbol, kind, price) = (
                    position.symbol.clone(),
                    position.kind,
                    position.current_price,
                );
                let deal = state.take_ticket();
                record_deal(&mut state, deal, ticket, &symbol, kind, volume, price, time);
                let outcome = TradeOutcome {
                    retcode: TradeRetcode::Done,
                    order: ticket,
                    deal,
                    price,
                    volume,
                    comment: "partial close".into(),
                };
                (symbol, Some(kind), volume, price, outcome)
            }
            TradeAction::CloseById { ticket } => {
                let mut state = self.state();
                let index = state
                    .positions
                    .iter()
                    .position(|p| p.ticket == ticket)
                    .ok_or(HostError::UnknownTicket(ticket))?;
                let position = state.positions.remove(index);
                let price = state.quote(&position.symbol);
                let deal = state.take_ticket();
                record_deal(
                    &mut state,
                    deal,
                    ticket,
                    &position.symbol,
                    position.kind,
                    position.volume,
                    price,
                    time,
                );
                let outcome = TradeOutcome {
                    retcode: TradeRetcode::Done,
                    order: ticket,
                    deal,
                    price,
                    volume: position.volume,
                    comment: "closed".into(),
                };
                (
                    position.symbol,
                    Some(position.kind),
                    position.volume,
                    price,
                    outcome,
                )
            }
            TradeAction::CloseBySymbol { symbol } => {
                let mut state = self.state();
                let tickets: Vec<i64> = state
                    .positions
                    .iter()
                    .filter(|p| p.symbol == symbol)
                    .map(|p| p.ticket)
                    .collect();
                if tickets.is_empty() {
                    return Err(HostError::UnknownSymbol(symbol));
                }
                drop(state);
                let mut last = None;
                for ticket in tickets {
                    last = Some(self.execute(TradeAction::CloseById { ticket })?);
                }
                // Loop ran at least once
                return last.ok_or(HostError::UnknownSymbol(symbol));
            }
            TradeAction::ModifyOrder {
                ticket,
                price,
                stop_loss,
                take_profit,
            } => {
                let mut state = self.state();
                let order = state
                    .orders
                    .iter_mut()
                    .find(|o| o.ticket == ticket)
                    .ok_or(HostError::UnknownTicket(ticket))?;
                if let Some(p) = price {
                    order.price = p;
                }
                if let Some(sl) = stop_loss {
                    order.stop_loss = sl;
                }
                if let Some(tp) = take_profit {
                    order.take_profit = tp;
                }
                let (symbol, kind, volume, price) =
                    (order.symbol.clone(), order.kind, order.volume, order.price);
                let outcome = TradeOutcome {
                    retcode: TradeRetcode::Done,
                    order: ticket,
                    deal: 0,
                    price,
                    volume,
                    comment: "order modified".into(),
                };
                (symbol, Some(kind), volume, price, outcome)
            }
            TradeAction::CancelOrder { ticket } => {
                let mut state = self.state();
                let index = state
                    .orders
                    .iter()
                    .position(|o| o.ticket == ticket)
                    .ok_or(HostError::UnknownTicket(ticket))?;
                let order = state.orders.remove(index);
                let outcome = TradeOutcome {
                    retcode: TradeRetcode::Done,
                    order: ticket,
                    deal: 0,
                    price: order.price,
                    volume: order.volume,
                    comment: "cancelled".into(),
                };
                (
                    order.symbol,
                    Some(order.kind),
                    order.volume,
                    order.price,
                    outcome,
                )
            }
        };

        self.notify(TradeTransaction {
            symbol,
            kind,
            volume,
            price,
            outcome: outcome.clone(),
            time,
        });
        Ok(outcome)
    }
}

fn synth_bar(time: Timestamp, close: Decimal) -> Bar {
    Bar {
        time,
        open: close - dec!(0.00040),
        high: close + dec!(0.00030),
        low: close - dec!(0.00060),
        close,
        tick_volume: 64,
    }
}

#[allow(clippy::too_many_arguments)]
fn record_deal(
    state: &mut SimState,
    deal: i64,
    order: i64,
    symbol: &str,
    kind: OrderKind,
    volume: Decimal,
    price: Decimal,
    time: Timestamp,
) {
    state.deals.push(Deal {
        ticket: deal,
        order,
        symbol: symbol.to_string(),
        kind,
        volume,
        price,
        profit: Decimal::ZERO,
        time,
    });
}
