//! Gateway configuration parameters
//!
//! All tunable parameters for the gateway.  Built-in defaults match the
//! stock deployment (ThingsBoard cloud, Arduino on `/dev/ttyACM0`);
//! values can be overridden by a JSON file and then by CLI flags.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pins::{self, PinId};

/// Core gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    // --- Platform / broker ---
    /// Broker host name
    pub host: String,
    /// Broker TCP port
    pub mqtt_port: u16,
    /// Broker keep-alive (seconds)
    pub keep_alive_secs: u16,
    /// MQTT client identifier
    pub client_id: String,
    /// Device access token (MQTT username and HTTP path segment)
    pub access_token: String,
    /// Topic filter for inbound RPC requests
    pub rpc_request_topic: String,
    /// Topic for device attribute updates
    pub attributes_topic: String,

    // --- HTTP telemetry ---
    /// Platform base URL, e.g. `https://thingsboard.cloud`
    pub http_base_url: String,
    /// Upload request timeout (seconds)
    pub http_timeout_secs: u32,

    // --- Serial ---
    /// Serial device path
    pub serial_port: String,
    /// Serial baud rate
    pub serial_baud: u32,
    /// Bounded read timeout per line (milliseconds)
    pub serial_read_timeout_ms: u32,
    /// Field separator used by the sensor board
    pub field_delimiter: char,
    /// Fixed delay after every ingest iteration (milliseconds)
    pub poll_delay_ms: u32,
    /// Wait before closing and re-opening after a port error (seconds)
    pub reconnect_delay_secs: u32,
    /// Extra wait after a failed re-open (seconds)
    pub reopen_retry_delay_secs: u32,

    // --- GPIO ---
    /// Fixed, closed enumeration of controllable pins
    pub pins: Vec<PinId>,
    /// Optional pin → kernel GPIO line remapping (identity when absent)
    pub gpio_lines: BTreeMap<PinId, u32>,
    /// sysfs GPIO class directory
    pub gpio_sysfs_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            // Platform
            host: "thingsboard.cloud".into(),
            mqtt_port: 1883,
            keep_alive_secs: 60,
            client_id: "tbgateway".into(),
            access_token: String::new(),
            rpc_request_topic: "v1/devices/me/rpc/request/+".into(),
            attributes_topic: "v1/devices/me/attributes".into(),

            // HTTP
            http_base_url: "https://thingsboard.cloud".into(),
            http_timeout_secs: 10,

            // Serial
            serial_port: "/dev/ttyACM0".into(),
            serial_baud: 9600,
            serial_read_timeout_ms: 1000,
            field_delimiter: 'x',
            poll_delay_ms: 100,
            reconnect_delay_secs: 5,
            reopen_retry_delay_secs: 10,

            // GPIO
            pins: pins::default_pins(),
            gpio_lines: BTreeMap::new(),
            gpio_sysfs_path: "/sys/class/gpio".into(),
        }
    }
}

impl GatewayConfig {
    /// `POST` endpoint for one-shot telemetry uploads.
    pub fn telemetry_url(&self) -> String {
        format!(
            "{}/api/v1/{}/telemetry",
            self.http_base_url.trim_end_matches('/'),
            self.access_token
        )
    }

    /// Kernel GPIO line backing `pin`.
    pub fn gpio_line(&self, pin: PinId) -> u32 {
        self.gpio_lines
            .get(&pin)
            .copied()
            .unwrap_or(u32::from(pin.get()))
    }

    /// Range and consistency checks.  Rejects rather than clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("access_token is empty"));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("host is empty"));
        }
        if self.client_id.is_empty() {
            return Err(ConfigError::ValidationFailed("client_id is empty"));
        }
        if !self.rpc_request_topic.split('/').any(|s| s == "request") {
            return Err(ConfigError::ValidationFailed(
                "rpc_request_topic has no 'request' segment",
            ));
        }
        if self.pins.is_empty() {
            return Err(ConfigError::ValidationFailed("pin enumeration is empty"));
        }
        let mut sorted = self.pins.clone();
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(ConfigError::ValidationFailed("pin enumeration has duplicates"));
        }
        if self.gpio_lines.keys().any(|p| !self.pins.contains(p)) {
            return Err(ConfigError::ValidationFailed(
                "gpio_lines remaps a pin outside the enumeration",
            ));
        }
        let d = self.field_delimiter;
        if d.is_ascii_digit() || d.is_whitespace() || matches!(d, '.' | '-' | '+') {
            return Err(ConfigError::ValidationFailed(
                "field_delimiter collides with number syntax",
            ));
        }
        if self.serial_baud == 0 {
            return Err(ConfigError::ValidationFailed("serial_baud must be > 0"));
        }
        if self.serial_read_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("serial_read_timeout_ms must be > 0"));
        }
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed("http_timeout_secs must be > 0"));
        }
        if self.keep_alive_secs < 5 {
            return Err(ConfigError::ValidationFailed("keep_alive_secs must be >= 5"));
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Error type
// ───────────────────────────────────────────────────────────────

/// Errors from loading or validating configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file does not exist.
    NotFound(String),
    /// The config file could not be read.
    Io(String),
    /// The config file is not valid JSON for [`GatewayConfig`].
    Parse(String),
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "config file {} not found", path),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
            Self::Parse(msg) => write!(f, "parse error: {}", msg),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
