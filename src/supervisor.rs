//! Process lifecycle: start-up ordering, the main loop, shutdown.
//!
//! ```text
//!  start:    serial open ─▶ GPIO init (LOW) ─▶ MQTT connect + subscribe
//!                                               │
//!            spawn rpc-dispatch ◀───────────────┤
//!            spawn mqtt-io      ◀───────────────┘
//!
//!  run:      SerialIngestLoop::run on the calling thread
//!
//!  shutdown: serial close ─▶ MQTT disconnect ─▶ join mqtt-io
//!            ─▶ join rpc-dispatch ─▶ GPIO release
//! ```
//!
//! Serial open and broker connect are fatal.  Per-pin GPIO failures are
//! logged and start-up continues.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::adapters::hardware::SysfsPinBank;
use crate::adapters::http::HttpTelemetry;
use crate::adapters::log_sink::LogEventSink;
use crate::adapters::mqtt::{self, MqttBroker};
use crate::adapters::serial_link::SerialLink;
use crate::adapters::time::{StdDelay, SystemClock};
use crate::app::pin_state::PinStateStore;
use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, GpioPort, LineSource};
use crate::config::GatewayConfig;
use crate::error::Error;
use crate::pins::PinId;
use crate::rpc::channels::InboundChannel;
use crate::rpc::dispatcher::RpcDispatcher;
use crate::rpc::io_task;
use crate::serial::backoff::FixedBackoff;
use crate::serial::ingest::{IngestSettings, SerialIngestLoop};
use crate::telemetry::uploader::TelemetryUploader;

type Ingest = SerialIngestLoop<SerialLink, HttpTelemetry, SystemClock, StdDelay, FixedBackoff>;
type Dispatcher = RpcDispatcher<SysfsPinBank, MqttBroker>;

/// Drive every pin LOW, reporting each failure as a [`AppEvent::GpioFault`].
/// Returns how many pins failed.
fn initialise_pins(
    gpio: &mut impl GpioPort,
    pins: &[PinId],
    sink: &mut impl EventSink,
) -> usize {
    let failures = gpio.initialize(pins);
    for e in &failures {
        sink.emit(&AppEvent::GpioFault(Error::from(*e)));
    }
    if !failures.is_empty() {
        warn!("{} of {} pins failed to initialise", failures.len(), pins.len());
    }
    failures.len()
}

pub struct Supervisor {
    shutdown: Arc<AtomicBool>,
    inbound: Arc<InboundChannel>,
    ingest: Ingest,
    broker: MqttBroker,
    mqtt_io: JoinHandle<()>,
    dispatcher: JoinHandle<Dispatcher>,
    sink: LogEventSink,
}

impl Supervisor {
    /// Bring the gateway up.  `shutdown` is the flag the signal handler
    /// raises; install the handler first so a signal during start-up is
    /// honoured once [`run`](Self::run) begins.
    pub fn start(config: &GatewayConfig, shutdown: Arc<AtomicBool>) -> Result<Self> {
        config.validate().context("invalid configuration")?;

        let mut serial = SerialLink::from_config(config)
            .map_err(Error::from)
            .with_context(|| format!("opening serial port {}", config.serial_port))?;
        let http = HttpTelemetry::from_config(config)
            .map_err(Error::from)
            .context("building HTTP client")?;

        let mut sink = LogEventSink::new();
        let mut gpio = SysfsPinBank::from_config(config);
        initialise_pins(&mut gpio, &config.pins, &mut sink);
        let store = Arc::new(PinStateStore::new(&config.pins));

        let (broker, session) = match mqtt::connect(config) {
            Ok(pair) => pair,
            Err(e) => {
                gpio.release();
                serial.close();
                return Err(Error::from(e)).context("connecting to broker");
            }
        };

        let inbound = Arc::new(InboundChannel::new());

        let dispatcher = RpcDispatcher::new(
            store,
            gpio,
            broker.clone(),
            config.attributes_topic.clone(),
        );
        let dispatcher =
            io_task::spawn(dispatcher, Arc::clone(&inbound)).context("spawning RPC dispatcher")?;

        let mqtt_io = match session.spawn(Arc::clone(&inbound), Arc::clone(&shutdown)) {
            Ok(handle) => handle,
            Err(e) => {
                io_task::close(&inbound);
                if let Ok(d) = dispatcher.join() {
                    d.into_gpio().release();
                }
                return Err(e).context("spawning MQTT event loop");
            }
        };

        let ingest = SerialIngestLoop::new(
            serial,
            TelemetryUploader::new(http, config.telemetry_url()),
            SystemClock,
            StdDelay,
            FixedBackoff::from(config),
            IngestSettings::from_config(config),
        );

        info!("Gateway started");
        Ok(Self {
            shutdown,
            inbound,
            ingest,
            broker,
            mqtt_io,
            dispatcher,
            sink,
        })
    }

    /// Serial ingest on the calling thread until the shutdown flag is set.
    pub fn run(&mut self) {
        self.ingest.run(&self.shutdown, &mut self.sink);
    }

    pub fn shutdown(mut self) {
        info!("Shutting down");
        self.shutdown.store(true, Ordering::Release);

        self.ingest.close();
        self.broker.disconnect();

        if self.mqtt_io.join().is_err() {
            warn!("MQTT event loop panicked");
            io_task::close(&self.inbound);
        }
        match self.dispatcher.join() {
            Ok(dispatcher) => dispatcher.into_gpio().release(),
            Err(_) => warn!("RPC dispatcher panicked; GPIO lines not driven LOW"),
        }
        info!("Shutdown complete");
    }
}
