//! MQTT broker adapter (rumqttc, synchronous client).
//!
//! ```text
//!   MqttBroker (BrokerPort) ──publish──▶ rumqttc request queue
//!                                              │
//!   MqttSession::run  ◀── Connection::iter ◀───┘
//!        │  ConnAck  → (re)subscribe to the RPC request filter
//!        │  Publish  → io_task::forward
//!        └  exit     → io_task::close
//! ```
//!
//! Authentication is ThingsBoard style: the device access token is the
//! username, the password is empty.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, info, warn};
use rumqttc::{
    Client, Connection, ConnectReturnCode, Event, Incoming, MqttOptions, Outgoing, QoS,
};

use crate::app::ports::{BrokerPort, Qos};
use crate::config::GatewayConfig;
use crate::error::CommsError;
use crate::rpc::channels::{InboundChannel, InboundMessage};
use crate::rpc::io_task;

/// Client request queue capacity.
const REQUEST_CAP: usize = 16;
/// Pause before the event loop retries a dropped connection.
const RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Publish half of the broker connection.  Cheap to clone.
#[derive(Clone)]
pub struct MqttBroker {
    client: Client,
}

/// Receive half: owns the event loop.
pub struct MqttSession {
    client: Client,
    connection: Connection,
    rpc_filter: String,
}

fn to_qos(qos: Qos) -> QoS {
    match qos {
        Qos::AtMostOnce => QoS::AtMostOnce,
        Qos::AtLeastOnce => QoS::AtLeastOnce,
        Qos::ExactlyOnce => QoS::ExactlyOnce,
    }
}

/// Connect and wait for the first CONNACK.  Anything but an accepted
/// session is an error.
pub fn connect(config: &GatewayConfig) -> Result<(MqttBroker, MqttSession), CommsError> {
    let (broker, mut session) = open(config);
    await_connack(&mut session.connection)?;
    info!("MQTT connected to {}:{}", config.host, config.mqtt_port);

    subscribe(&session.client, &session.rpc_filter)?;
    Ok((broker, session))
}

/// Build the client pair without touching the network.
fn open(config: &GatewayConfig) -> (MqttBroker, MqttSession) {
    let mut options = MqttOptions::new(&config.client_id, &config.host, config.mqtt_port);
    options.set_credentials(&config.access_token, "");
    options.set_keep_alive(Duration::from_secs(config.keep_alive_secs.into()));

    let (client, connection) = Client::new(options, REQUEST_CAP);
    let session = MqttSession {
        client: client.clone(),
        connection,
        rpc_filter: config.rpc_request_topic.clone(),
    };
    (MqttBroker { client }, session)
}

fn subscribe(client: &Client, filter: &str) -> Result<(), CommsError> {
    client
        .try_subscribe(filter, QoS::AtLeastOnce)
        .map_err(|e| CommsError::SubscribeFailed(e.to_string()))?;
    debug!("MQTT subscribed to {}", filter);
    Ok(())
}

fn await_connack(connection: &mut Connection) -> Result<(), CommsError> {
    for notification in connection.iter() {
        match notification {
            Ok(Event::Incoming(Incoming::ConnAck(ack))) => {
                return if ack.code == ConnectReturnCode::Success {
                    Ok(())
                } else {
                    Err(CommsError::ConnectFailed(format!("{:?}", ack.code)))
                };
            }
            Ok(_) => {}
            Err(e) => return Err(CommsError::ConnectFailed(e.to_string())),
        }
    }
    Err(CommsError::ConnectFailed("event loop ended".into()))
}

impl MqttBroker {
    /// Queue a DISCONNECT.  The session loop ends once it goes out.
    pub fn disconnect(&self) {
        if let Err(e) = self.client.disconnect() {
            warn!("MQTT disconnect failed: {}", e);
        }
    }
}

impl BrokerPort for MqttBroker {
    fn publish(&mut self, topic: &str, payload: Vec<u8>, qos: Qos) -> Result<(), CommsError> {
        self.client
            .publish(topic, to_qos(qos), false, payload)
            .map_err(|e| CommsError::PublishFailed(e.to_string()))
    }
}

impl MqttSession {
    /// Drive the event loop until the client disconnects, or the link
    /// drops after `shutdown` is raised.  Always closes `inbound`.
    ///
    /// The connection is dropped before `inbound` is closed, so a
    /// dispatcher still publishing gets an error instead of waiting on a
    /// request queue nobody drains.
    pub fn run(self, inbound: &InboundChannel, shutdown: &AtomicBool) {
        let Self {
            client,
            mut connection,
            rpc_filter,
        } = self;

        for notification in connection.iter() {
            match notification {
                Ok(Event::Incoming(Incoming::ConnAck(ack))) => {
                    if ack.code == ConnectReturnCode::Success {
                        info!("MQTT reconnected");
                        if let Err(e) = subscribe(&client, &rpc_filter) {
                            warn!("MQTT {}", e);
                        }
                    }
                }
                Ok(Event::Incoming(Incoming::Publish(publish))) => {
                    io_task::forward(
                        inbound,
                        InboundMessage {
                            topic: publish.topic,
                            payload: publish.payload.to_vec(),
                        },
                    );
                }
                Ok(Event::Outgoing(Outgoing::Disconnect)) => break,
                Ok(_) => {}
                Err(e) => {
                    if shutdown.load(Ordering::Acquire) {
                        break;
                    }
                    warn!("MQTT connection error: {}", e);
                    std::thread::sleep(RETRY_PAUSE);
                }
            }
        }
        info!("MQTT event loop stopped");
        drop(connection);
        io_task::close(inbound);
    }

    /// Run the session on its own thread.
    pub fn spawn(
        self,
        inbound: Arc<InboundChannel>,
        shutdown: Arc<AtomicBool>,
    ) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("mqtt-io".into())
            .spawn(move || self.run(&inbound, &shutdown))
    }
}
