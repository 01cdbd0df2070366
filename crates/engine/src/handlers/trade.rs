//! Order-execution handlers
//!
//! The shims build a `TradeAction` from the payload and hand it to the
//! host. A completed action whose retcode signals failure is reported
//! as an ERROR envelope carrying the host diagnostic; the raw
//! transaction still reaches subscribers through the event emitter.

use rust_decimal::Decimal;
use serde_json::{Map, Value, json};
use termlink_core::{OrderKind, Payload, TradeAction, TradeOutcome, TradeRetcode};
use termlink_ports::HostError;

use crate::error::CommandError;
use crate::handlers::{Table, object, required_str, required_ticket};
use crate::router::{DispatchCtx, Request};

pub(super) fn register(table: &mut Table) {
    table.insert("TRADE_ORDER_TYPE_BUY", order_buy);
    table.insert("TRADE_ORDER_TYPE_SELL", order_sell);
    table.insert("TRADE_ORDER_TYPE_BUY_LIMIT", order_buy_limit);
    table.insert("TRADE_ORDER_TYPE_SELL_LIMIT", order_sell_limit);
    table.insert("TRADE_ORDER_TYPE_BUY_STOP", order_buy_stop);
    table.insert("TRADE_ORDER_TYPE_SELL_STOP", order_sell_stop);
    table.insert("TRADE_POSITION_MODIFY", position_modify);
    table.insert("TRADE_POSITION_PARTIAL", position_partial);
    table.insert("TRADE_POSITION_CLOSE_ID", position_close_id);
    table.insert("TRADE_POSITION_CLOSE", position_close);
    table.insert("TRADE_ORDER_MODIFY", order_modify);
    table.insert("TRADE_ORDER_CANCEL", order_cancel);
}

fn order_buy(ctx: &mut DispatchCtx<'_>, req: &Request) -> Result<Map<String, Value>, CommandError> {
    open_order(ctx, req, OrderKind::Buy)
}

fn order_sell(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    open_order(ctx, req, OrderKind::Sell)
}

fn order_buy_limit(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    open_order(ctx, req, OrderKind::BuyLimit)
}

fn order_sell_limit(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    open_order(ctx, req, OrderKind::SellLimit)
}

fn order_buy_stop(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    open_order(ctx, req, OrderKind::BuyStop)
}

fn order_sell_stop(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    open_order(ctx, req, OrderKind::SellStop)
}

fn open_order(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
    kind: OrderKind,
) -> Result<Map<String, Value>, CommandError> {
    let symbol = required_str(&req.payload, "symbol")?.to_string();
    let volume = req
        .payload
        .positive_decimal("volume")
        .ok_or_else(|| CommandError::validation("Missing or invalid field: volume"))?;
    let price = if kind.is_pending() {
        Some(
            req.payload
                .positive_decimal("price")
                .ok_or_else(|| CommandError::validation("Missing or invalid field: price"))?,
        )
    } else {
        // Market orders execute at the current quote
        None
    };
    let outcome = ctx.host.execute(TradeAction::Open {
        kind,
        symbol,
        volume,
        price,
        stop_loss: optional_price(&req.payload, "sl"),
        take_profit: optional_price(&req.payload, "tp"),
        comment: req.payload.str_field("comment").to_string(),
    })?;
    outcome_fields(outcome)
}

fn position_modify(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let outcome = ctx.host.execute(TradeAction::ModifyPosition {
        ticket: required_ticket(&req.payload)?,
        stop_loss: optional_price(&req.payload, "sl"),
        take_profit: optional_price(&req.payload, "tp"),
    })?;
    outcome_fields(outcome)
}

fn position_partial(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let outcome = ctx.host.execute(TradeAction::ClosePartial {
        ticket: required_ticket(&req.payload)?,
        volume: req
            .payload
            .positive_decimal("volume")
            .ok_or_else(|| CommandError::validation("Missing or invalid field: volume"))?,
    })?;
    outcome_fields(outcome)
}

fn position_close_id(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let outcome = ctx.host.execute(TradeAction::CloseById {
        ticket: required_ticket(&req.payload)?,
    })?;
    outcome_fields(outcome)
}

fn position_close(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let outcome = ctx.host.execute(TradeAction::CloseBySymbol {
        symbol: required_str(&req.payload, "symbol")?.to_string(),
    })?;
    outcome_fields(outcome)
}

fn order_modify(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let outcome = ctx.host.execute(TradeAction::ModifyOrder {
        ticket: required_ticket(&req.payload)?,
        price: optional_price(&req.payload, "price"),
        stop_loss: optional_price(&req.payload, "sl"),
        take_profit: optional_price(&req.payload, "tp"),
    })?;
    outcome_fields(outcome)
}

fn order_cancel(
    ctx: &mut DispatchCtx<'_>,
    req: &Request,
) -> Result<Map<String, Value>, CommandError> {
    let outcome = ctx.host.execute(TradeAction::CancelOrder {
        ticket: required_ticket(&req.payload)?,
    })?;
    outcome_fields(outcome)
}

/// Zero or absent means unset for price-like fields
fn optional_price(payload: &Payload, key: &str) -> Option<Decimal> {
    payload.positive_decimal(key)
}

fn outcome_fields(outcome: TradeOutcome) -> Result<Map<String, Value>, CommandError> {
    if !matches!(outcome.retcode, TradeRetcode::Done | TradeRetcode::Placed) {
        return Err(CommandError::Host(HostError::Rejected {
            retcode: outcome.retcode,
            message: outcome.comment,
        }));
    }
    Ok(object(json!({
        "retcode": outcome.retcode,
        "order": outcome.order,
        "deal": outcome.deal,
        "price": outcome.price,
        "volume": outcome.volume,
        "result": outcome.comment,
    })))
}
