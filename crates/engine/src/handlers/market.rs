//! Market-data query handlers

use serde_json::{Map, Value, json};
use termlink_core::IndicatorSpec;

use crate::error::CommandError;
use crate::handlers::{Table, object, required_str, required_timeframe};
use crate::router::{DispatchCtx, Request};

pub(super) fn register(table: &mut Table) {
    table.insert("POSITIONS", positions);
    table.insert("ORDERS", orders);
    table.insert("HISTORY_DATA", history_data);
    table.insert("HISTORY_TRADES", history_trades);
    table.insert("GET_INDICATOR_MA", indicator_ma);
    table.insert("GET_OHLC", get_ohlc);
    table.insert("GET_TICK", get_tick);
}

fn positions(
    ctx: &mut DispatchCtx<'_>,
    _req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let positions = ctx.host.positions()?;
    Ok(object(json!({ "positions": positions })))
}

fn orders(ctx: &mut DispatchCtx<'_>, _req: &Request) -> Result<Map<String, Value>, CommandError> {
    let orders = ctx.host.orders()?;
    Ok(object(json!({ "orders": orders })))
}

fn history_data(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let symbol = required_str(&req.payload, "symbol")?;
    let timeframe = required_timeframe(&req.payload)?;
    let from = req.payload.i64_field("from");
    let to = req.payload.i64_field("to");
    let bars = ctx.host.history_bars(symbol, timeframe, from, to)?;
    Ok(object(json!({ "data": bars })))
}

fn history_trades(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let from = req.payload.i64_field("from");
    let to = req.payload.i64_field("to");
    let deals = ctx.host.history_deals(from, to)?;
    Ok(object(json!({ "trades": deals })))
}

fn indicator_ma(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let symbol = required_str(&req.payload, "symbol")?;
    let timeframe = required_timeframe(&req.payload)?;
    let spec = IndicatorSpec::checked("MA", req.payload.i64_field("period"))
        .ok_or_else(|| CommandError::validation("Missing or invalid field: period"))?;
    let value = ctx.host.indicator_value(symbol, timeframe, &spec)?;
    Ok(object(json!({ "ma_value": value })))
}

fn get_ohlc(ctx: &mut DispatchCtx<'_>, req: &Request) -> Result<Map<String, Value>, CommandError> {
    let symbol = required_str(&req.payload, "symbol")?;
    let timeframe = required_timeframe(&req.payload)?;
    let bar = ctx.host.latest_bar(symbol, timeframe)?;
    Ok(object(json!({ "ohlc": bar })))
}

fn get_tick(ctx: &mut DispatchCtx<'_>, req: &Request) -> Result<Map<String, Value>, CommandError> {
    let symbol = required_str(&req.payload, "symbol")?;
    let tick = ctx.host.tick(symbol)?;
    Ok(object(json!({ "tick": tick })))
}
