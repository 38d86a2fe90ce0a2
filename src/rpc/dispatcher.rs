//! RPC dispatcher: routes decoded requests to the pin state and the broker.
//!
//! Every inbound message runs to completion in one pass:
//!
//! 1. **Decode**: JSON envelope; malformed payloads are dropped.
//! 2. **Interpret**: method + params into an [`RpcCommand`]; unknown
//!    methods and bad params are dropped.
//! 3. **Execute**: `getGpioStatus` reads the snapshot; `setGpioStatus`
//!    drives the pin and records it (write-then-record).
//! 4. **Publish**: the snapshot goes to the response topic, and after a
//!    successful set also to the attributes topic.  QoS 1, no retries.
//!
//! A dropped request produces no response at all; the platform sees a
//! timeout.

use core::fmt;
use std::sync::Arc;

use log::{debug, info};

use crate::app::commands::{
    CommandError, METHOD_GET_GPIO_STATUS, METHOD_SET_GPIO_STATUS, RpcCommand,
};
use crate::app::events::AppEvent;
use crate::app::pin_state::{PinSnapshot, PinStateStore};
use crate::app::ports::{BrokerPort, EventSink, GpioPort, Qos};
use crate::error::{CommsError, Error};
use crate::pins::PinId;

use super::channels::{BrokerEvent, InboundChannel, InboundMessage};
use super::envelope::{EnvelopeError, RpcEnvelope};

/// All outbound RPC traffic uses at-least-once delivery.
const RPC_QOS: Qos = Qos::AtLeastOnce;

/// Result of handling one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// `getGpioStatus` answered.
    Responded,
    /// `setGpioStatus` applied.  Publishes are best-effort after this point.
    Updated { pin: PinId, level: bool },
    /// Nothing was published.
    Dropped(DropReason),
}

/// Why a request produced no response.
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    Malformed(EnvelopeError),
    Command(CommandError),
    /// The request topic has no `request` segment to swap.
    NoResponseTopic(String),
    /// Unknown pin or failed GPIO write.
    Rejected(Error),
    Encode(String),
    Publish(CommsError),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "{e}"),
            Self::Command(e) => write!(f, "{e}"),
            Self::NoResponseTopic(t) => write!(f, "no response topic for {t}"),
            Self::Rejected(e) => write!(f, "{e}"),
            Self::Encode(e) => write!(f, "snapshot encode failed: {e}"),
            Self::Publish(e) => write!(f, "{e}"),
        }
    }
}

/// Single-consumer dispatcher owning the GPIO port and a broker handle.
pub struct RpcDispatcher<G, B> {
    store: Arc<PinStateStore>,
    gpio: G,
    broker: B,
    attributes_topic: String,
}

impl<G: GpioPort, B: BrokerPort> RpcDispatcher<G, B> {
    pub fn new(
        store: Arc<PinStateStore>,
        gpio: G,
        broker: B,
        attributes_topic: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gpio,
            broker,
            attributes_topic: attributes_topic.into(),
        }
    }

    /// Consume the inbound channel until the broker side closes it.
    ///
    /// Returns the dispatcher so the caller can release the GPIO port.
    pub fn run(mut self, inbound: &InboundChannel, sink: &mut impl EventSink) -> Self {
        info!("RPC dispatcher started");
        loop {
            match futures_lite::future::block_on(inbound.receive()) {
                BrokerEvent::Message(msg) => {
                    self.handle_message(&msg, sink);
                }
                BrokerEvent::Closed => break,
            }
        }
        info!("RPC dispatcher stopped");
        self
    }

    /// Decode and dispatch one raw broker message.
    pub fn handle_message(
        &mut self,
        msg: &InboundMessage,
        sink: &mut impl EventSink,
    ) -> DispatchOutcome {
        debug!(
            "RPC <- {} ({} bytes): {}",
            msg.topic,
            msg.payload.len(),
            String::from_utf8_lossy(&msg.payload)
        );
        let outcome = match RpcEnvelope::decode(&msg.topic, &msg.payload) {
            Ok(env) => self.dispatch(&env, sink),
            Err(e) => DispatchOutcome::Dropped(DropReason::Malformed(e)),
        };
        if let DispatchOutcome::Dropped(reason) = &outcome {
            sink.emit(&AppEvent::RpcDropped(reason.clone()));
        }
        outcome
    }

    /// Execute a decoded envelope.
    pub fn dispatch(&mut self, env: &RpcEnvelope, sink: &mut impl EventSink) -> DispatchOutcome {
        let cmd = match RpcCommand::try_from(env) {
            Ok(cmd) => cmd,
            Err(e) => return DispatchOutcome::Dropped(DropReason::Command(e)),
        };
        let Some(response_topic) = env.response_topic() else {
            return DispatchOutcome::Dropped(DropReason::NoResponseTopic(env.topic.clone()));
        };

        match cmd {
            RpcCommand::GetGpioStatus => {
                let payload = match encode_snapshot(&self.store.snapshot()) {
                    Ok(p) => p,
                    Err(reason) => return DispatchOutcome::Dropped(reason),
                };
                match self.broker.publish(&response_topic, payload, RPC_QOS) {
                    Ok(()) => {
                        sink.emit(&AppEvent::RpcResponded {
                            method: METHOD_GET_GPIO_STATUS,
                            topic: response_topic,
                        });
                        DispatchOutcome::Responded
                    }
                    Err(e) => DispatchOutcome::Dropped(DropReason::Publish(e)),
                }
            }
            RpcCommand::SetGpioStatus { pin, enabled } => {
                if let Err(e) = self.store.apply(pin, enabled, &mut self.gpio) {
                    return DispatchOutcome::Dropped(DropReason::Rejected(e));
                }
                sink.emit(&AppEvent::PinChanged { pin, level: enabled });

                // One snapshot feeds both publishes so they carry identical bytes.
                let payload = match encode_snapshot(&self.store.snapshot()) {
                    Ok(p) => p,
                    Err(reason) => return DispatchOutcome::Dropped(reason),
                };

                match self.broker.publish(&response_topic, payload.clone(), RPC_QOS) {
                    Ok(()) => sink.emit(&AppEvent::RpcResponded {
                        method: METHOD_SET_GPIO_STATUS,
                        topic: response_topic,
                    }),
                    Err(error) => sink.emit(&AppEvent::PublishFailed {
                        topic: response_topic,
                        error,
                    }),
                }

                let topic = self.attributes_topic.clone();
                match self.broker.publish(&topic, payload, RPC_QOS) {
                    Ok(()) => sink.emit(&AppEvent::AttributesPublished { topic }),
                    Err(error) => sink.emit(&AppEvent::PublishFailed { topic, error }),
                }

                DispatchOutcome::Updated { pin, level: enabled }
            }
        }
    }

    pub fn store(&self) -> &Arc<PinStateStore> {
        &self.store
    }

    /// Hand back the GPIO port (for release at shutdown).
    pub fn into_gpio(self) -> G {
        self.gpio
    }
}

fn encode_snapshot(snapshot: &PinSnapshot) -> Result<Vec<u8>, DropReason> {
    serde_json::to_vec(snapshot).map_err(|e| DropReason::Encode(e.to_string()))
}
