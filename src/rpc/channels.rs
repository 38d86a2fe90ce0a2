//! RPC inter-thread communication channel.
//!
//! Uses an `embassy-sync` bounded MPMC channel to bridge the broker's
//! receive loop with the single-consumer RPC dispatcher.  Messages are
//! handled strictly in arrival order, one at a time.
//!
//! ```text
//! ┌──────────────┐  BrokerEvent  ┌──────────────┐
//! │  MQTT I/O    │──────────────▶│ RpcDispatcher│
//! │  thread      │               │  thread      │
//! └──────────────┘               └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Channel depth for inbound broker messages.
pub const INBOUND_DEPTH: usize = 16;

/// One message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// What the broker side hands to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerEvent {
    Message(InboundMessage),
    /// The broker connection is gone for good; the consumer should exit.
    Closed,
}

/// Inbound channel: broker I/O thread → dispatcher thread.
pub type InboundChannel = Channel<CriticalSectionRawMutex, BrokerEvent, INBOUND_DEPTH>;
