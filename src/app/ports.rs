//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RpcDispatcher / SerialIngestLoop (domain)
//! ```
//!
//! Driven adapters (GPIO lines, broker client, serial device, HTTP client)
//! implement these traits.  The dispatcher and the ingest loop consume
//! them via generics, so the domain core never touches hardware or the
//! network directly.  Delays go through [`embedded_hal::delay::DelayNs`]
//! rather than a port of our own.

use crate::app::events::AppEvent;
use crate::config::{ConfigError, GatewayConfig};
use crate::error::{ActuatorError, CommsError, SerialError, UploadError};
use crate::pins::PinId;

/// Maximum serial line length (bytes, excluding the terminator).
pub const MAX_LINE_LEN: usize = 256;

/// One framed line from the sensor board, terminator stripped.
pub type LineBuf = heapless::Vec<u8, MAX_LINE_LEN>;

// ───────────────────────────────────────────────────────────────
// GPIO port (driven adapter: domain → output pins)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the controllable output pins.
pub trait GpioPort {
    /// Configure `pin` as an output.
    fn setup_output(&mut self, pin: PinId) -> Result<(), ActuatorError>;

    /// Drive `pin` HIGH (`true`) or LOW (`false`).
    fn set_output(&mut self, pin: PinId, level: bool) -> Result<(), ActuatorError>;

    /// Drive every configured pin LOW and give the lines back to the OS.
    fn release(&mut self);

    /// Configure every pin as an output and drive it LOW.
    ///
    /// A pin that fails is skipped; the others are still set up.  Returns
    /// the failures for the caller to report.
    fn initialize(&mut self, pins: &[PinId]) -> Vec<ActuatorError> {
        let mut failures = Vec::new();
        for &pin in pins {
            let result = self
                .setup_output(pin)
                .and_then(|()| self.set_output(pin, false));
            if let Err(e) = result {
                failures.push(e);
            }
        }
        failures
    }
}

// ───────────────────────────────────────────────────────────────
// Broker port (driven adapter: domain → MQTT)
// ───────────────────────────────────────────────────────────────

/// MQTT delivery guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qos {
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

/// Outbound publish capability of the broker connection.
pub trait BrokerPort {
    /// Queue `payload` for delivery on `topic`.  Does not retry.
    fn publish(&mut self, topic: &str, payload: Vec<u8>, qos: Qos) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Line source (driven adapter: serial device → domain)
// ───────────────────────────────────────────────────────────────

/// Newline-framed byte source with a bounded read timeout.
pub trait LineSource {
    /// Read one line.
    ///
    /// * `Ok(Some(line))`: a complete line, terminator removed.
    /// * `Ok(None)`: the read timed out with no complete line.
    /// * `Err(_)`: port-level failure; the caller owns recovery.
    fn read_line(&mut self) -> Result<Option<LineBuf>, SerialError>;

    /// Re-open the device after a failure.
    fn reopen(&mut self) -> Result<(), SerialError>;

    /// Close the device.  Idempotent.
    fn close(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (driven adapter: domain → HTTP)
// ───────────────────────────────────────────────────────────────

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// One-shot JSON `POST`.
pub trait TelemetryPort {
    /// Send `body` (already JSON-encoded) to `url`.  Only transport
    /// failures are errors; any HTTP status comes back as a reply.
    fn post_json(&mut self, url: &str, body: Vec<u8>) -> Result<HttpReply, UploadError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Wall-clock source for telemetry timestamps.
pub trait ClockPort {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads gateway configuration.
///
/// Implementations return the parsed config as-is; validation is the
/// caller's job once CLI overrides have been applied.
pub trait ConfigPort {
    fn load(&self) -> Result<GatewayConfig, ConfigError>;
}
