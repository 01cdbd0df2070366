//! Subscription manager: the set of active streaming feeds
//!
//! Owned exclusively by the dispatcher. Transitions run while inbound
//! commands are drained; removal is a tombstone mark compacted between
//! the drain and the poll of the same tick, so the poll never
//! enumerates a list that is being shifted under it.

use log::{debug, warn};
use rust_decimal::Decimal;
use serde::Serialize;
use termlink_core::{Bar, IndicatorSpec, Timeframe, Timestamp};
use termlink_ports::TradingHost;
use thiserror::Error;

/// Subscription transition errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("Missing or empty field: {0}")]
    MissingField(&'static str),

    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("No active stream matched")]
    NoMatch,

    #[error("Empty subscription config list")]
    EmptyConfig,
}

/// One active streaming feed
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Request id of the command that created this entry; grouped
    /// stop/replace matches on it
    pub owner_request_id: String,
    /// Open time of the last bar pushed for this feed. Advances only
    /// after a successful send referencing that exact bar.
    pub last_emitted_at: Timestamp,
    pub indicators: Vec<IndicatorSpec>,
    removed: bool,
}

/// Unvalidated grouped-subscription config as extracted from a
/// command payload
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub symbol: String,
    pub timeframe: String,
    /// (kind, period) pairs; invalid entries are skipped, not fatal
    pub indicators: Vec<(String, i64)>,
}

/// One symbol's worth of a combined indicator update
#[derive(Debug, Clone, Serialize)]
pub struct GroupedEntry {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub ohlc: Bar,
    pub indicators: Vec<IndicatorValue>,
}

/// Computed indicator value for one entry
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorValue {
    pub kind: String,
    pub period: u32,
    pub value: Decimal,
}

/// Combined update covering every indicator-bearing subscription with
/// fresh data this tick
#[derive(Debug, Clone)]
pub struct GroupedUpdate {
    /// Request id of the first contributing subscription
    pub request_id: String,
    pub entries: Vec<GroupedEntry>,
    contributors: Vec<(u64, Timestamp)>,
}

/// Individual update for one indicator-free subscription
#[derive(Debug, Clone)]
pub struct SingleUpdate {
    id: u64,
    pub request_id: String,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub bar: Bar,
}

/// Everything one poll pass wants to emit. Nothing is committed until
/// the corresponding send succeeded.
#[derive(Debug, Clone, Default)]
pub struct TickUpdates {
    pub grouped: Option<GroupedUpdate>,
    pub singles: Vec<SingleUpdate>,
}

impl Default for GroupedUpdate {
    fn default() -> Self {
        Self {
            request_id: String::new(),
            entries: Vec::new(),
            contributors: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SubscriptionManager {
    entries: Vec<Subscription>,
    next_id: u64,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-tombstoned) subscriptions
    pub fn active_len(&self) -> usize {
        self.entries.iter().filter(|s| !s.removed).count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_len() == 0
    }

    /// Live subscriptions, in insertion order
    pub fn active(&self) -> impl Iterator<Item = &Subscription> {
        self.entries.iter().filter(|s| !s.removed)
    }

    fn validate_pair(symbol: &str, timeframe: &str) -> Result<Timeframe, StreamError> {
        if symbol.trim().is_empty() {
            return Err(StreamError::MissingField("symbol"));
        }
        if timeframe.trim().is_empty() {
            return Err(StreamError::MissingField("timeframe"));
        }
        Timeframe::parse(timeframe)
            .ok_or_else(|| StreamError::InvalidTimeframe(timeframe.to_string()))
    }

    fn push(
        &mut self,
        symbol: String,
        timeframe: Timeframe,
        owner_request_id: String,
        indicators: Vec<IndicatorSpec>,
    ) {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Subscription {
            id,
            symbol,
            timeframe,
            owner_request_id,
            last_emitted_at: 0,
            indicators,
            removed: false,
        });
    }

    /// Install one plain OHLC feed
    pub fn start_simple(
        &mut self,
        symbol: &str,
        timeframe: &str,
        request_id: &str,
    ) -> Result<(), StreamError> {
        let tf = Self::validate_pair(symbol, timeframe)?;
        self.push(symbol.to_string(), tf, request_id.to_string(), Vec::new());
        debug!("stream started: {symbol} {tf} (owner {request_id})");
        Ok(())
    }

    /// Replace every subscription owned by `request_id` with the given
    /// configs. Old entries are removed first; a config with an
    /// invalid symbol/timeframe aborts the whole command with nothing
    /// installed. Invalid indicator entries are skipped silently.
    pub fn start_grouped(
        &mut self,
        configs: Vec<StreamConfig>,
        request_id: &str,
    ) -> Result<usize, StreamError> {
        if configs.is_empty() {
            return Err(StreamError::EmptyConfig);
        }
        let replaced = self.mark_owned(request_id);
        if replaced > 0 {
            debug!("grouped restart for {request_id}: replacing {replaced} entries");
        }

        let mut validated = Vec::with_capacity(configs.len());
        for config in &configs {
            let tf = Self::validate_pair(&config.symbol, &config.timeframe)?;
            let indicators: Vec<IndicatorSpec> = config
                .indicators
                .iter()
                .filter_map(|(kind, period)| {
                    let spec = IndicatorSpec::checked(kind, *period);
                    if spec.is_none() {
                        warn!(
                            "skipping invalid indicator ({kind:?}, {period}) for {}",
                            config.symbol
                        );
                    }
                    spec
                })
                .collect();
            validated.push((config.symbol.clone(), tf, indicators));
        }

        let installed = validated.len();
        for (symbol, tf, indicators) in validated {
            self.push(symbol, tf, request_id.to_string(), indicators);
        }
        Ok(installed)
    }

    /// Remove every subscription matching the (symbol, timeframe) pair
    /// exactly. Errors when nothing matched.
    pub fn stop_simple(&mut self, symbol: &str, timeframe: &str) -> Result<usize, StreamError> {
        let tf = Self::validate_pair(symbol, timeframe)?;
        let mut removed = 0;
        for sub in self.entries.iter_mut().filter(|s| !s.removed) {
            if sub.symbol == symbol && sub.timeframe == tf {
                sub.removed = true;
                removed += 1;
            }
        }
        if removed == 0 {
            return Err(StreamError::NoMatch);
        }
        Ok(removed)
    }

    /// Remove every subscription owned by `request_id`. Errors when
    /// nothing matched.
    pub fn stop_grouped(&mut self, request_id: &str) -> Result<usize, StreamError> {
        let removed = self.mark_owned(request_id);
        if removed == 0 {
            return Err(StreamError::NoMatch);
        }
        Ok(removed)
    }

    fn mark_owned(&mut self, request_id: &str) -> usize {
        let mut marked = 0;
        for sub in self.entries.iter_mut().filter(|s| !s.removed) {
            if sub.owner_request_id == request_id {
                sub.removed = true;
                marked += 1;
            }
        }
        marked
    }

    /// Drop tombstoned entries. Called by the dispatcher between the
    /// inbound drain and the poll; never during enumeration.
    pub fn compact(&mut self) {
        self.entries.retain(|s| !s.removed);
    }

    /// Scan all live subscriptions for fresh bars. Pure read pass: it
    /// fetches from the host and builds candidate updates, advancing
    /// nothing. A feed whose fetch or indicator computation fails is
    /// skipped this tick and retried on the next.
    pub fn collect(&self, host: &dyn TradingHost) -> TickUpdates {
        let mut updates = TickUpdates::default();
        let mut grouped = GroupedUpdate::default();

        for sub in self.active() {
            let bar = match host.latest_bar(&sub.symbol, sub.timeframe) {
                Ok(bar) => bar,
                Err(e) => {
                    warn!("bar fetch failed for {} {}: {e}", sub.symbol, sub.timeframe);
                    continue;
                }
            };
            if bar.time <= sub.last_emitted_at {
                continue;
            }

            if sub.indicators.is_empty() {
                updates.singles.push(SingleUpdate {
                    id: sub.id,
                    request_id: sub.owner_request_id.clone(),
                    symbol: sub.symbol.clone(),
                    timeframe: sub.timeframe,
                    bar,
                });
            } else {
                let mut values = Vec::with_capacity(sub.indicators.len());
                for spec in &sub.indicators {
                    match host.indicator_value(&sub.symbol, sub.timeframe, spec) {
                        Ok(value) => values.push(IndicatorValue {
                            kind: spec.kind.clone(),
                            period: spec.period,
                            value,
                        }),
                        // A failing indicator never fails its entry
                        Err(e) => warn!(
                            "indicator {}({}) failed for {}: {e}",
                            spec.kind, spec.period, sub.symbol
                        ),
                    }
                }
                if grouped.entries.is_empty() {
                    grouped.request_id = sub.owner_request_id.clone();
                }
                grouped.contributors.push((sub.id, bar.time));
                grouped.entries.push(GroupedEntry {
                    symbol: sub.symbol.clone(),
                    timeframe: sub.timeframe,
                    ohlc: bar,
                    indicators: values,
                });
            }
        }

        if !grouped.entries.is_empty() {
            updates.grouped = Some(grouped);
        }
        updates
    }

    /// Advance `last_emitted_at` for every contributor of a combined
    /// update that was actually sent
    pub fn commit_grouped(&mut self, update: &GroupedUpdate) {
        for &(id, bar_time) in &update.contributors {
            self.advance(id, bar_time);
        }
    }

    /// Advance `last_emitted_at` for one sent individual update
    pub fn commit_single(&mut self, update: &SingleUpdate) {
        self.advance(update.id, update.bar.time);
    }

    fn advance(&mut self, id: u64, bar_time: Timestamp) {
        if let Some(sub) = self.entries.iter_mut().find(|s| s.id == id) {
            // Monotonic: a commit never moves the watermark backwards
            sub.last_emitted_at = sub.last_emitted_at.max(bar_time);
        }
    }
}
