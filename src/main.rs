//! tbgateway: ThingsBoard edge gateway entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                    │
//! │                                                               │
//! │  OutputPinBank   MqttBroker/Session   SerialLink   HttpTelem. │
//! │  (GpioPort)      (BrokerPort)         (LineSource) (Telemetry)│
//! │  SystemClock     StdDelay             LogEventSink            │
//! │                                                               │
//! │  ──────────────── Port Trait Boundary ──────────────────      │
//! │                                                               │
//! │  ┌──────────────────────────┐   ┌──────────────────────────┐  │
//! │  │ RpcDispatcher            │   │ SerialIngestLoop         │  │
//! │  │ (rpc-dispatch thread)    │   │ (main thread)            │  │
//! │  └────────────┬─────────────┘   └──────────────────────────┘  │
//! │               ▼                                               │
//! │         PinStateStore                                         │
//! └───────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use tbgateway::adapters::config_file::JsonConfigFile;
use tbgateway::app::ports::ConfigPort;
use tbgateway::cli::Cli;
use tbgateway::config::GatewayConfig;
use tbgateway::supervisor::Supervisor;

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .parse_filters(&cli.log_level)
        .format_timestamp_millis()
        .init();

    let mut config = match &cli.config {
        Some(path) => JsonConfigFile::new(path)
            .load()
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GatewayConfig::default(),
    };
    cli.apply(&mut config);

    info!(
        "tbgateway {} | broker={}:{} serial={}@{} pins={}",
        env!("CARGO_PKG_VERSION"),
        config.host,
        config.mqtt_port,
        config.serial_port,
        config.serial_baud,
        config.pins.len()
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("Termination signal received");
        flag.store(true, Ordering::Release);
    })
    .context("installing signal handler")?;

    let mut supervisor = Supervisor::start(&config, shutdown)?;

    supervisor.run();
    supervisor.shutdown();
    Ok(())
}
