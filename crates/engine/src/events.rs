//! Trade-event emitter
//!
//! Converts trade transaction notifications from the host into
//! outgoing stream fields. Only terminal outcomes reach the bus:
//! no-op codes and anything outside the reportable set are discarded
//! as noise, not errors.

use log::debug;
use serde_json::{Map, Value, json};
use termlink_core::TradeTransaction;

/// Build the fields of a `TRADE_EVENT` stream envelope, or `None`
/// when the transaction is filtered out.
pub fn convert(tx: &TradeTransaction) -> Option<Map<String, Value>> {
    if !tx.outcome.retcode.is_reportable() {
        debug!(
            "discarding transaction for {} (retcode {:?})",
            tx.symbol, tx.outcome.retcode
        );
        return None;
    }
    let value = json!({
        "request": {
            "symbol": tx.symbol,
            "kind": tx.kind,
            "volume": tx.volume,
            "price": tx.price,
        },
        "result": {
            "retcode": tx.outcome.retcode,
            "order": tx.outcome.order,
            "deal": tx.outcome.deal,
            "price": tx.outcome.price,
            "volume": tx.outcome.volume,
            "comment": tx.outcome.comment,
        },
        "time": tx.time,
    });
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
