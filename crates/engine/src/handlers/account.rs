//! Administrative and account-query handlers

use serde_json::{Map, Value, json};

use crate::error::CommandError;
use crate::handlers::{Table, object};
use crate::router::{DispatchCtx, Request};

pub(super) fn register(table: &mut Table) {
    table.insert("PING", ping);
    table.insert("GET_STATUS_INFO", status_info);
    table.insert("GET_BROKER_INFO", broker_info);
    table.insert("GET_ACCOUNT_INFO", account_info);
    table.insert("GET_ACCOUNT_BALANCE", account_balance);
    table.insert("GET_ACCOUNT_LEVERAGE", account_leverage);
    table.insert("GET_ACCOUNT_FLAGS", account_flags);
    table.insert("GET_ACCOUNT_MARGIN", account_margin);
    table.insert("GET_ACCOUNT_STATE", account_state);
    table.insert("GET_TIME_SERVER", time_server);
}

fn ping(ctx: &mut DispatchCtx<'_>, req: &Request) -> Result<Map<String, Value>, CommandError> {
    Ok(object(json!({
        "original_timestamp": req.payload.f64_field("timestamp"),
        "pong_timestamp": ctx.clock.now(),
    })))
}

fn status_info(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let balance = ctx.host.account_balance()?;
    Ok(object(json!({
        "trade_allowed": ctx.host.trade_allowed(),
        "balance": balance.balance,
        "original_timestamp": req.payload.f64_field("timestamp"),
        "pong_timestamp": ctx.clock.now(),
    })))
}

fn broker_info(
    ctx: &mut DispatchCtx<'_>,
    _req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let info = ctx.host.broker_info()?;
    Ok(object(json!({
        "company": info.company,
        "server": info.server,
    })))
}

fn account_info(
    ctx: &mut DispatchCtx<'_>,
    _req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let info = ctx.host.account_info()?;
    Ok(object(json!({
        "login": info.login,
        "name": info.name,
        "currency": info.currency,
    })))
}

fn account_balance(
    ctx: &mut DispatchCtx<'_>,
    _req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let balance = ctx.host.account_balance()?;
    Ok(object(json!({
        "balance": balance.balance,
        "equity": balance.equity,
        "currency": balance.currency,
    })))
}

fn account_leverage(
    ctx: &mut DispatchCtx<'_>,
    _req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    Ok(object(json!({ "leverage": ctx.host.account_leverage()? })))
}

fn account_flags(
    ctx: &mut DispatchCtx<'_>,
    _req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let flags = ctx.host.account_flags()?;
    Ok(object(json!({
        "trade_allowed": flags.trade_allowed,
        "expert_enabled": flags.expert_enabled,
    })))
}

fn account_margin(
    ctx: &mut DispatchCtx<'_>,
    _req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let margin = ctx.host.account_margin()?;
    Ok(object(json!({
        "margin": margin.margin,
        "free_margin": margin.free_margin,
        "margin_level": margin.margin_level,
    })))
}

fn account_state(
    ctx: &mut DispatchCtx<'_>,
    _req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    Ok(object(json!({ "account_state": ctx.host.account_state()? })))
}

fn time_server(
    ctx: &mut DispatchCtx<'_>,
    _req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    Ok(object(json!({ "time_server": ctx.host.server_time()? })))
}
