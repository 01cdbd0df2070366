//! Smoke tests against a fully wired, running bridge task

use std::time::Duration;

use serde_json::json;
use termlink_core::{MessageKind, OutboundMessage, Status};
use termlink_gateway::{ChannelSubscriber, Publisher, Subscriber};
use termlink_runner::{BridgeConfig, bootstrap};
use tokio::time::timeout;

const CONFIG: &str = r#"
    broker_key = "smoke-broker"

    [ports]
    admin = 15555
    data = 15556
    trade = 15557
    live = 15558
    events = 15559

    [timing]
    tick_ms = 50
    heartbeat_secs = 1
"#;

async fn next_message(rx: &mut ChannelSubscriber) -> OutboundMessage {
    let frame = timeout(Duration::from_secs(5), rx.next())
        .await
        .expect("timed out waiting for a frame")
        .expect("channel closed");
    OutboundMessage::from_value(serde_json::from_str(&frame).unwrap()).unwrap()
}

async fn next_event(rx: &mut ChannelSubscriber, event: &str) -> OutboundMessage {
    loop {
        let msg = next_message(rx).await;
        if msg.event.as_deref() == Some(event) {
            return msg;
        }
    }
}

#[tokio::test]
async fn ping_round_trip_over_the_bus() {
    let config = BridgeConfig::parse(CONFIG).unwrap();
    let mut bridge = bootstrap::start(&config).unwrap();

    let register = next_message(&mut bridge.client.admin.rx).await;
    assert_eq!(register.kind, MessageKind::System);
    assert_eq!(register.event.as_deref(), Some("REGISTER"));
    assert_eq!(register.broker_key, "smoke-broker");

    bridge
        .client
        .admin
        .tx
        .publish(
            &json!({
                "command": "PING",
                "request_id": "r1",
                "payload": {"timestamp": 1700000000.25},
            })
            .to_string(),
        )
        .await
        .unwrap();

    let reply = next_message(&mut bridge.client.admin.rx).await;
    assert_eq!(reply.kind, MessageKind::Response);
    assert_eq!(reply.status, Some(Status::Ok));
    assert_eq!(reply.request_id.as_deref(), Some("r1"));
    assert_eq!(reply.fields["original_timestamp"], 1700000000.25);

    let _ = bridge.shutdown.send(());
    bridge.handle.await.unwrap();
}

#[tokio::test]
async fn stream_updates_and_heartbeats_flow_on_the_live_channel() {
    let config = BridgeConfig::parse(CONFIG).unwrap();
    let mut bridge = bootstrap::start(&config).unwrap();

    bridge
        .client
        .data
        .tx
        .publish(
            &json!({
                "command": "START_STREAM_OHLC",
                "request_id": "r1",
                "payload": {"symbol": "EURUSD", "timeframe": "M1"},
            })
            .to_string(),
        )
        .await
        .unwrap();

    let reply = next_message(&mut bridge.client.data.rx).await;
    assert_eq!(reply.status, Some(Status::Ok));

    let update = next_event(&mut bridge.client.live, "OHLC_UPDATE").await;
    assert_eq!(update.kind, MessageKind::Stream);
    assert_eq!(update.fields["symbol"], "EURUSD");
    assert_eq!(update.fields["timeframe"], "M1");
    assert!(update.fields["ohlc"]["close"].is_string());

    let beat = next_event(&mut bridge.client.live, "HEARTBEAT").await;
    assert_eq!(beat.kind, MessageKind::System);

    let _ = bridge.shutdown.send(());
    bridge.handle.await.unwrap();
}
