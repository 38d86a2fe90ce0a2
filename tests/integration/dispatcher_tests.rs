//! RPC dispatcher against mock GPIO and a recording broker.

use std::sync::Arc;

use serde_json::{Value, json};
use tbgateway::app::events::AppEvent;
use tbgateway::app::pin_state::PinStateStore;
use tbgateway::app::ports::Qos;
use tbgateway::pins::{PinId, default_pins};
use tbgateway::rpc::channels::InboundMessage;
use tbgateway::rpc::dispatcher::{DispatchOutcome, DropReason, RpcDispatcher};

use crate::mock_hw::{GpioCall, MockBroker, MockGpio, RecordingSink};

const ATTRIBUTES: &str = "v1/devices/me/attributes";

fn dispatcher(gpio: MockGpio) -> (RpcDispatcher<MockGpio, MockBroker>, MockBroker) {
    let broker = MockBroker::new();
    let store = Arc::new(PinStateStore::new(&default_pins()));
    (
        RpcDispatcher::new(store, gpio, broker.clone(), ATTRIBUTES),
        broker,
    )
}

fn request(id: u32, payload: Value) -> InboundMessage {
    InboundMessage {
        topic: format!("v1/devices/me/rpc/request/{id}"),
        payload: serde_json::to_vec(&payload).unwrap(),
    }
}

fn set(id: u32, pin: u16, enabled: bool) -> InboundMessage {
    request(
        id,
        json!({"method": "setGpioStatus", "params": {"pin": pin, "enabled": enabled}}),
    )
}

fn get(id: u32) -> InboundMessage {
    request(id, json!({"method": "getGpioStatus", "params": {}}))
}

fn as_json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

// ── getGpioStatus ─────────────────────────────────────────────

#[test]
fn get_publishes_full_snapshot_on_response_topic() {
    let (mut d, broker) = dispatcher(MockGpio::new());
    let mut sink = RecordingSink::default();

    assert_eq!(d.handle_message(&get(17), &mut sink), DispatchOutcome::Responded);

    let published = broker.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].topic, "v1/devices/me/rpc/response/17");
    assert_eq!(published[0].qos, Qos::AtLeastOnce);

    let body = as_json(&published[0].payload);
    let map = body.as_object().unwrap();
    assert_eq!(map.len(), default_pins().len());
    assert!(map.values().all(|v| v == &Value::Bool(false)));
    assert_eq!(map["40"], Value::Bool(false));
}

#[test]
fn get_has_no_gpio_side_effects() {
    let (mut d, _broker) = dispatcher(MockGpio::new());
    d.handle_message(&get(1), &mut RecordingSink::default());
    assert!(d.into_gpio().calls.is_empty());
}

// ── setGpioStatus ─────────────────────────────────────────────

#[test]
fn set_drives_pin_and_publishes_response_and_attributes() {
    let (mut d, broker) = dispatcher(MockGpio::new());
    let mut sink = RecordingSink::default();

    let outcome = d.handle_message(&set(5, 7, true), &mut sink);
    assert_eq!(
        outcome,
        DispatchOutcome::Updated {
            pin: PinId::new(7),
            level: true
        }
    );

    let published = broker.published();
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].topic, "v1/devices/me/rpc/response/5");
    assert_eq!(published[1].topic, ATTRIBUTES);
    assert_eq!(published[0].payload, published[1].payload);
    assert!(published.iter().all(|p| p.qos == Qos::AtLeastOnce));

    let body = as_json(&published[0].payload);
    assert_eq!(body["7"], Value::Bool(true));
    assert_eq!(body["11"], Value::Bool(false));

    assert!(d.store().snapshot()[&PinId::new(7)]);
    assert!(sink.events.contains(&AppEvent::PinChanged {
        pin: PinId::new(7),
        level: true
    }));
    assert_eq!(d.into_gpio().writes(), vec![(PinId::new(7), true)]);
}

#[test]
fn repeated_set_is_idempotent() {
    let (mut d, broker) = dispatcher(MockGpio::new());
    let mut sink = RecordingSink::default();

    d.handle_message(&set(1, 11, true), &mut sink);
    let first = d.store().snapshot();
    d.handle_message(&set(2, 11, true), &mut sink);

    assert_eq!(d.store().snapshot(), first);
    let published = broker.published();
    assert_eq!(published[1].payload, published[3].payload);
}

#[test]
fn later_set_wins() {
    let (mut d, _broker) = dispatcher(MockGpio::new());
    let mut sink = RecordingSink::default();
    d.handle_message(&set(1, 13, true), &mut sink);
    d.handle_message(&set(2, 13, false), &mut sink);
    assert!(!d.store().snapshot()[&PinId::new(13)]);
}

#[test]
fn unknown_pin_is_dropped_without_side_effects() {
    let (mut d, broker) = dispatcher(MockGpio::new());
    let mut sink = RecordingSink::default();
    let before = d.store().snapshot();

    let outcome = d.handle_message(&set(3, 8, true), &mut sink);
    assert!(matches!(
        outcome,
        DispatchOutcome::Dropped(DropReason::Rejected(_))
    ));

    assert!(broker.published().is_empty());
    assert_eq!(d.store().snapshot(), before);
    assert!(!d.store().contains(PinId::new(8)));
    assert!(d.into_gpio().calls.is_empty());
}

#[test]
fn gpio_failure_leaves_state_unchanged() {
    let (mut d, broker) = dispatcher(MockGpio::failing_on(&[12]));
    let mut sink = RecordingSink::default();

    let outcome = d.handle_message(&set(4, 12, true), &mut sink);
    assert!(matches!(
        outcome,
        DispatchOutcome::Dropped(DropReason::Rejected(_))
    ));
    assert!(!d.store().snapshot()[&PinId::new(12)]);
    assert!(broker.published().is_empty());
    assert_eq!(d.into_gpio().calls, vec![GpioCall::Set(PinId::new(12), true)]);
}

#[test]
fn failed_response_publish_still_updates_attributes() {
    let (mut d, broker) = dispatcher(MockGpio::new());
    broker.fail_topic("v1/devices/me/rpc/response/9");
    let mut sink = RecordingSink::default();

    let outcome = d.handle_message(&set(9, 15, true), &mut sink);
    assert!(matches!(outcome, DispatchOutcome::Updated { .. }));

    let published = broker.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].topic, ATTRIBUTES);
    assert!(
        sink.events
            .iter()
            .any(|e| matches!(e, AppEvent::PublishFailed { .. }))
    );
    assert!(d.store().snapshot()[&PinId::new(15)]);
}

// ── Malformed traffic ─────────────────────────────────────────

#[test]
fn malformed_payload_is_dropped() {
    let (mut d, broker) = dispatcher(MockGpio::new());
    let mut sink = RecordingSink::default();
    let msg = InboundMessage {
        topic: "v1/devices/me/rpc/request/1".into(),
        payload: b"{not json".to_vec(),
    };

    assert!(matches!(
        d.handle_message(&msg, &mut sink),
        DispatchOutcome::Dropped(DropReason::Malformed(_))
    ));
    assert!(broker.published().is_empty());
    assert!(matches!(sink.events.as_slice(), [AppEvent::RpcDropped(_)]));
}

#[test]
fn unknown_method_is_dropped() {
    let (mut d, broker) = dispatcher(MockGpio::new());
    let msg = request(2, json!({"method": "reboot", "params": {}}));
    assert!(matches!(
        d.handle_message(&msg, &mut RecordingSink::default()),
        DispatchOutcome::Dropped(DropReason::Command(_))
    ));
    assert!(broker.published().is_empty());
}

#[test]
fn bad_params_are_dropped() {
    let cases = [
        json!({"method": "setGpioStatus", "params": {"pin": 7}}),
        json!({"method": "setGpioStatus", "params": {"enabled": true}}),
        json!({"method": "setGpioStatus", "params": {"pin": "7", "enabled": true}}),
        json!({"method": "setGpioStatus", "params": {"pin": 7, "enabled": 1}}),
        json!({"method": "setGpioStatus", "params": {"pin": -7, "enabled": true}}),
        json!({"method": "setGpioStatus"}),
    ];
    for (id, payload) in cases.into_iter().enumerate() {
        let (mut d, broker) = dispatcher(MockGpio::new());
        let outcome = d.handle_message(&request(id as u32, payload), &mut RecordingSink::default());
        assert!(
            matches!(outcome, DispatchOutcome::Dropped(DropReason::Command(_))),
            "case {id}: {outcome:?}"
        );
        assert!(broker.published().is_empty());
        assert!(d.into_gpio().calls.is_empty());
    }
}

#[test]
fn topic_without_request_segment_is_dropped() {
    let (mut d, broker) = dispatcher(MockGpio::new());
    let msg = InboundMessage {
        topic: "v1/devices/me/rpc/requests/1".into(),
        payload: br#"{"method":"getGpioStatus","params":{}}"#.to_vec(),
    };
    assert!(matches!(
        d.handle_message(&msg, &mut RecordingSink::default()),
        DispatchOutcome::Dropped(DropReason::NoResponseTopic(_))
    ));
    assert!(broker.published().is_empty());
}
