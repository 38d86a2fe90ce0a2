//! Command-line flags.  Each flag, when given, overrides the matching
//! config field.

use std::path::PathBuf;

use clap::Parser;

use crate::config::GatewayConfig;

/// ThingsBoard gateway: GPIO over MQTT RPC, serial sensor telemetry over HTTP.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Cli {
    /// JSON config file; missing fields use built-in defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Device access token
    #[arg(short, long, env = "TB_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Broker host
    #[arg(long, env = "TB_HOST")]
    pub host: Option<String>,

    /// Broker port
    #[arg(long)]
    pub port: Option<u16>,

    /// Serial device path
    #[arg(short, long, env = "TB_SERIAL_PORT")]
    pub serial_port: Option<String>,

    /// Serial baud rate
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Base URL for HTTP telemetry uploads
    #[arg(long)]
    pub http_base_url: Option<String>,

    /// Log filter (env_logger syntax)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn apply(&self, config: &mut GatewayConfig) {
        if let Some(token) = &self.token {
            config.access_token.clone_from(token);
        }
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.mqtt_port = port;
        }
        if let Some(path) = &self.serial_port {
            config.serial_port.clone_from(path);
        }
        if let Some(baud) = self.baud {
            config.serial_baud = baud;
        }
        if let Some(url) = &self.http_base_url {
            config.http_base_url.clone_from(url);
        }
    }
}
