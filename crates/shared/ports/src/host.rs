use rust_decimal::Decimal;
use termlink_core::{
    AccountBalance, AccountFlags, AccountInfo, AccountMargin, Bar, BrokerInfo, Deal,
    IndicatorSpec, PendingOrder, Position, Tick, Timeframe, Timestamp, TradeAction, TradeOutcome,
};

use crate::error::HostResult;

/// Port to the live trading terminal.
///
/// All calls are synchronous and assumed fast: the dispatcher blocks
/// its tick on each call with no timeout (accepted latency budget, see
/// the runner's tick configuration). Implementations must not retain
/// references into the dispatcher's state.
pub trait TradingHost: Send + Sync {
    // Identity / status

    fn broker_info(&self) -> HostResult<BrokerInfo>;
    fn account_info(&self) -> HostResult<AccountInfo>;
    fn account_balance(&self) -> HostResult<AccountBalance>;
    fn account_leverage(&self) -> HostResult<i64>;
    fn account_flags(&self) -> HostResult<AccountFlags>;
    fn account_margin(&self) -> HostResult<AccountMargin>;
    /// Account mode as reported by the terminal (`"DEMO"`, `"REAL"`, ...)
    fn account_state(&self) -> HostResult<String>;
    /// Trade server time, epoch seconds
    fn server_time(&self) -> HostResult<Timestamp>;
    /// Cheap permission check sampled every tick
    fn trade_allowed(&self) -> bool;

    // Portfolio

    fn positions(&self) -> HostResult<Vec<Position>>;
    fn orders(&self) -> HostResult<Vec<PendingOrder>>;
    fn history_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from: Timestamp,
        to: Timestamp,
    ) -> HostResult<Vec<Bar>>;
    fn history_deals(&self, from: Timestamp, to: Timestamp) -> HostResult<Vec<Deal>>;

    // Market data

    /// Most recent (possibly still-forming) bar
    fn latest_bar(&self, symbol: &str, timeframe: Timeframe) -> HostResult<Bar>;
    fn tick(&self, symbol: &str) -> HostResult<Tick>;
    /// Current value of an indicator over the latest bars
    fn indicator_value(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        spec: &IndicatorSpec,
    ) -> HostResult<Decimal>;

    // Execution

    fn execute(&self, action: TradeAction) -> HostResult<TradeOutcome>;
}
