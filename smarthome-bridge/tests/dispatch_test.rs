use serde_json::json;

use smarthome_bridge::services::{DispatchOutcome, DropReason, MessageKind};

mod common;
use common::mock_bridge::MockBridge;

#[tokio::test]
async fn test_sensor_data_scenario() {
    let bridge = MockBridge::new().await;

    let outcome = bridge
        .dispatcher
        .dispatch(
            "SmartHome/esp_02/data",
            br#"{"temperature":24.5,"humidity":60,"light":300,"timestamp":"2024-01-01T00:00:00"}"#,
        )
        .await;

    assert_eq!(
        outcome,
        DispatchOutcome::Persisted {
            kind: MessageKind::Data,
            rows: 1
        }
    );

    let records = bridge.sensor_data().find_by_device_id("esp_02").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].device_id, "esp_02");
    assert_eq!(records[0].temperature, Some(24.5));
    assert_eq!(records[0].humidity, Some(60.0));
    assert_eq!(records[0].light, Some(300.0));
    assert_eq!(records[0].timestamp.as_deref(), Some("2024-01-01T00:00:00"));
    assert_eq!(bridge.total_rows().await, 1);
}

#[tokio::test]
async fn test_command_then_response_scenario() {
    let bridge = MockBridge::new().await;

    let outcome = bridge
        .dispatcher
        .dispatch(
            "SmartHome/esp_02/command",
            br#"{"id":"c1","command":"SET_MODE","params":{"mode":"auto"}}"#,
        )
        .await;
    assert!(matches!(outcome, DispatchOutcome::Persisted { kind: MessageKind::Command, .. }));

    let outcome = bridge
        .dispatcher
        .dispatch("SmartHome/esp_02/response", br#"{"cmd_id":"c1","status":"done"}"#)
        .await;
    assert_eq!(
        outcome,
        DispatchOutcome::Persisted {
            kind: MessageKind::Response,
            rows: 1
        }
    );

    let commands = bridge.commands().find_by_cmd_id("esp_02", "c1").await.unwrap();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].command.as_deref(), Some("SET_MODE"));
    assert_eq!(commands[0].status.as_deref(), Some("done"));
    assert_eq!(
        serde_json::Value::Object(commands[0].params_map().unwrap()),
        json!({"mode": "auto"})
    );
}

#[tokio::test]
async fn test_unknown_kind_then_next_message() {
    let bridge = MockBridge::new().await;

    let outcome = bridge
        .dispatcher
        .dispatch("SmartHome/esp_02/foo", br#"{"temperature":1}"#)
        .await;
    assert_eq!(outcome, DispatchOutcome::Dropped(DropReason::UnknownKind));
    assert_eq!(bridge.total_rows().await, 0);

    let outcome = bridge
        .dispatcher
        .dispatch("SmartHome/esp_02/data", br#"{"temperature":2}"#)
        .await;
    assert!(matches!(outcome, DispatchOutcome::Persisted { .. }));
    assert_eq!(bridge.row_count("sensor_data").await, 1);
}

#[tokio::test]
async fn test_response_without_command_is_noop() {
    let bridge = MockBridge::new().await;

    let outcome = bridge
        .dispatcher
        .dispatch("SmartHome/esp_02/response", br#"{"cmd_id":"ghost","status":"done"}"#)
        .await;

    assert_eq!(
        outcome,
        DispatchOutcome::Persisted {
            kind: MessageKind::Response,
            rows: 0
        }
    );
    assert_eq!(bridge.row_count("commands").await, 0);
}

#[tokio::test]
async fn test_info_upsert_is_idempotent() {
    let bridge = MockBridge::new().await;
    let payload = br#"{"ssid":"home","ip":"192.168.1.20","broker":"192.168.1.2","firmware":"1.0.0"}"#;

    for _ in 0..2 {
        bridge.dispatcher.dispatch("SmartHome/esp_01/info", payload).await;
    }
    assert_eq!(bridge.row_count("devices").await, 1);

    bridge
        .dispatcher
        .dispatch("SmartHome/esp_01/info", br#"{"ssid":"home","ip":"192.168.1.21","firmware":"1.1.0"}"#)
        .await;

    let device = bridge.devices().find_by_device_id("esp_01").await.unwrap().unwrap();
    assert_eq!(bridge.row_count("devices").await, 1);
    assert_eq!(device.ip_address.as_deref(), Some("192.168.1.21"));
    assert_eq!(device.firmware.as_deref(), Some("1.1.0"));
    assert!(device.broker.is_none());
}

#[tokio::test]
async fn test_sensor_data_is_not_idempotent() {
    let bridge = MockBridge::new().await;
    let payload = br#"{"temperature":24.5,"humidity":60,"light":300,"timestamp":"2024-01-01T00:00:00"}"#;

    bridge.dispatcher.dispatch("SmartHome/esp_02/data", payload).await;
    bridge.dispatcher.dispatch("SmartHome/esp_02/data", payload).await;

    assert_eq!(bridge.sensor_data().find_by_device_id("esp_02").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_state_snapshot_from_device_firmware() {
    let bridge = MockBridge::new().await;

    let outcome = bridge
        .dispatcher
        .dispatch(
            "SmartHome/esp_03/state",
            br#"{"timestamp":1704067200,"mode":1,"interval":30,"fan":1,"light":0,"ac":true}"#,
        )
        .await;
    assert!(matches!(outcome, DispatchOutcome::Persisted { kind: MessageKind::State, .. }));

    let state = bridge
        .device_states()
        .find_latest_by_device_id("esp_03")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.mode.as_deref(), Some("1"));
    assert_eq!(state.fan_status, Some(1));
    assert_eq!(state.light_status, Some(0));
    assert_eq!(state.ac_status, Some(1));
    assert_eq!(state.interval_value, Some(30));
    assert_eq!(state.timestamp.as_deref(), Some("1704067200"));
}

#[tokio::test]
async fn test_rejected_messages_never_write() {
    let bridge = MockBridge::new().await;

    let cases: [(&str, &[u8], DropReason); 5] = [
        ("SmartHome/esp_02/data", b"not json", DropReason::MalformedPayload),
        ("SmartHome/esp_02/data", b"[1,2]", DropReason::MalformedPayload),
        ("SmartHome/esp_02", br#"{"temperature":1}"#, DropReason::InvalidTopic),
        ("SmartHome", br#"{"temperature":1}"#, DropReason::InvalidTopic),
        ("Elsewhere/esp_02/data", br#"{"temperature":1}"#, DropReason::InvalidTopic),
    ];

    for (topic, payload, reason) in cases {
        let outcome = bridge.dispatcher.dispatch(topic, payload).await;
        assert_eq!(outcome, DispatchOutcome::Dropped(reason), "{topic}");
    }

    assert_eq!(bridge.total_rows().await, 0);
}
