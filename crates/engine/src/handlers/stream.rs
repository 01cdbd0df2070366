//! Streaming-subscription handlers

use serde_json::{Map, Value, json};

use crate::error::CommandError;
use crate::handlers::{Table, object};
use crate::router::{DispatchCtx, Request};
use crate::subscriptions::StreamConfig;

pub(super) fn register(table: &mut Table) {
    table.insert("START_STREAM_OHLC", start_stream);
    table.insert("STOP_STREAM", stop_stream);
    table.insert("START_STREAM_OHLC_INDICATORS", start_stream_indicators);
    table.insert("STOP_STREAM_OHLC_INDICATORS", stop_stream_indicators);
}

fn start_stream(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let symbol = req.payload.str_field("symbol");
    let timeframe = req.payload.str_field("timeframe");
    ctx.subs.start_simple(symbol, timeframe, &req.request_id)?;
    Ok(object(json!({
        "message": format!("Streaming started for {symbol} {timeframe}"),
    })))
}

fn stop_stream(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let symbol = req.payload.str_field("symbol");
    let timeframe = req.payload.str_field("timeframe");
    let removed = ctx.subs.stop_simple(symbol, timeframe)?;
    Ok(object(json!({
        "message": format!("Stopped {removed} stream(s) for {symbol} {timeframe}"),
    })))
}

fn start_stream_indicators(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let configs: Vec<StreamConfig> = req
        .payload
        .object_list("configs")
        .iter()
        .map(|config| StreamConfig {
            symbol: config.str_field("symbol").to_string(),
            timeframe: config.str_field("timeframe").to_string(),
            indicators: config
                .object_list("indicators")
                .iter()
                .map(|ind| (ind.str_field("kind").to_string(), ind.i64_field("period")))
                .collect(),
        })
        .collect();
    let installed = ctx.subs.start_grouped(configs, &req.request_id)?;
    Ok(object(json!({
        "message": format!("Streaming started for {installed} config(s)"),
    })))
}

fn stop_stream_indicators(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    // The stream to stop is named by the start command's id; clients
    // either reuse that id or pass it explicitly in the payload.
    let owner = req
        .payload
        .non_empty_str("owner_request_id")
        .unwrap_or(&req.request_id);
    let removed = ctx.subs.stop_grouped(owner)?;
    Ok(object(json!({
        "message": format!("Stopped {removed} grouped stream(s)"),
    })))
}
