//! Dispatcher thread fed through the inbound channel, as the broker
//! I/O thread would feed it.

use std::sync::Arc;

use serde_json::json;
use tbgateway::app::pin_state::PinStateStore;
use tbgateway::app::ports::GpioPort;
use tbgateway::pins::{PinId, default_pins};
use tbgateway::rpc::channels::{BrokerEvent, InboundChannel, InboundMessage};
use tbgateway::rpc::dispatcher::RpcDispatcher;
use tbgateway::rpc::io_task;

use crate::mock_hw::{GpioCall, MockBroker, MockGpio};

fn set(id: usize, pin: u16, enabled: bool) -> InboundMessage {
    InboundMessage {
        topic: format!("v1/devices/me/rpc/request/{id}"),
        payload: serde_json::to_vec(
            &json!({"method": "setGpioStatus", "params": {"pin": pin, "enabled": enabled}}),
        )
        .unwrap(),
    }
}

#[test]
fn messages_are_handled_in_arrival_order_until_closed() {
    let store = Arc::new(PinStateStore::new(&default_pins()));
    let broker = MockBroker::new();
    let inbound = Arc::new(InboundChannel::new());
    let dispatcher = RpcDispatcher::new(
        Arc::clone(&store),
        MockGpio::new(),
        broker.clone(),
        "v1/devices/me/attributes",
    );
    let handle = io_task::spawn(dispatcher, Arc::clone(&inbound)).unwrap();

    let script = [(7, true), (11, true), (7, false), (40, true)];
    for (id, &(pin, level)) in script.iter().enumerate() {
        futures_lite::future::block_on(inbound.send(BrokerEvent::Message(set(id, pin, level))));
    }
    io_task::close(&inbound);

    let dispatcher = handle.join().unwrap();
    let mut gpio = dispatcher.into_gpio();
    assert_eq!(
        gpio.writes(),
        script
            .iter()
            .map(|&(p, l)| (PinId::new(p), l))
            .collect::<Vec<_>>()
    );

    let snap = store.snapshot();
    assert!(!snap[&PinId::new(7)]);
    assert!(snap[&PinId::new(11)]);
    assert!(snap[&PinId::new(40)]);

    let responses: Vec<_> = broker
        .published()
        .into_iter()
        .filter(|p| p.topic.contains("/response/"))
        .map(|p| p.topic)
        .collect();
    assert_eq!(
        responses,
        (0..script.len())
            .map(|id| format!("v1/devices/me/rpc/response/{id}"))
            .collect::<Vec<_>>()
    );

    gpio.release();
    assert_eq!(gpio.calls.last(), Some(&GpioCall::Release));
}

#[test]
fn snapshot_readable_while_dispatcher_runs() {
    let store = Arc::new(PinStateStore::new(&default_pins()));
    let inbound = Arc::new(InboundChannel::new());
    let dispatcher = RpcDispatcher::new(
        Arc::clone(&store),
        MockGpio::new(),
        MockBroker::new(),
        "v1/devices/me/attributes",
    );
    let handle = io_task::spawn(dispatcher, Arc::clone(&inbound)).unwrap();

    for id in 0..200 {
        while !io_task::forward(&inbound, set(id, 22, id % 2 == 0)) {
            std::thread::yield_now();
        }
        assert_eq!(store.snapshot().len(), default_pins().len());
    }
    io_task::close(&inbound);
    handle.join().unwrap();

    // Last write (id 199) was LOW.
    assert!(!store.snapshot()[&PinId::new(22)]);
}
