//! RPC worker threads: bridges the broker receive loop to the dispatcher.
//!
//! ```text
//!  ┌─────────────────────┐  forward()   ┌──────────────────────┐
//!  │  MQTT I/O thread    │─────────────▶│  rpc-dispatch thread │
//!  │  (connection iter)  │  close()     │  RpcDispatcher::run  │
//!  └─────────────────────┘─────────────▶└──────────────────────┘
//! ```
//!
//! The I/O side never blocks on a full queue: a message that does not fit
//! is dropped with a warning and the caller sees an RPC timeout.  This
//! keeps the broker keep-alive serviced even if the dispatcher stalls on
//! a slow GPIO write.

use std::sync::Arc;
use std::thread::JoinHandle;

use log::warn;

use crate::adapters::log_sink::LogEventSink;
use crate::app::ports::{BrokerPort, GpioPort};

use super::channels::{BrokerEvent, InboundChannel, InboundMessage};
use super::dispatcher::RpcDispatcher;

/// Queue an inbound message for the dispatcher.  Returns `false` if the
/// queue was full and the message was dropped.
pub fn forward(inbound: &InboundChannel, msg: InboundMessage) -> bool {
    match inbound.try_send(BrokerEvent::Message(msg)) {
        Ok(()) => true,
        Err(_) => {
            warn!("RPC: inbound queue full, dropping message");
            false
        }
    }
}

/// Tell the dispatcher that no more messages will arrive.
///
/// Blocks until there is room; the dispatcher is always draining.
pub fn close(inbound: &InboundChannel) {
    futures_lite::future::block_on(inbound.send(BrokerEvent::Closed));
}

/// Spawn the dispatcher on its own thread.  Joining yields the dispatcher
/// back so the GPIO port can be released after the last RPC.
pub fn spawn<G, B>(
    dispatcher: RpcDispatcher<G, B>,
    inbound: Arc<InboundChannel>,
) -> std::io::Result<JoinHandle<RpcDispatcher<G, B>>>
where
    G: GpioPort + Send + 'static,
    B: BrokerPort + Send + 'static,
{
    std::thread::Builder::new()
        .name("rpc-dispatch".into())
        .spawn(move || {
            let mut sink = LogEventSink::new();
            dispatcher.run(&inbound, &mut sink)
        })
}
