//! Unified error types for the gateway.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! the supervisor's error handling uniform.  Subsystem errors stay small
//! and cloneable so they can be carried inside [`AppEvent`]s and test
//! assertions without allocation games.
//!
//! [`AppEvent`]: crate::app::events::AppEvent

use core::fmt;

use crate::config::ConfigError;
use crate::pins::PinId;

// ---------------------------------------------------------------------------
// Top-level gateway error
// ---------------------------------------------------------------------------

/// Every fallible operation in the gateway funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A pin identifier outside the configured enumeration was referenced.
    Pin(PinError),
    /// A GPIO output write or setup failed.
    Actuator(ActuatorError),
    /// The serial link to the sensor board failed.
    Serial(SerialError),
    /// A telemetry upload was rejected or never reached the platform.
    Upload(UploadError),
    /// The broker connection failed.
    Comms(CommsError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pin(e) => write!(f, "pin: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Serial(e) => write!(f, "serial: {e}"),
            Self::Upload(e) => write!(f, "upload: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Pin errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinError {
    /// The identifier is not part of the fixed pin enumeration.
    UnknownPin(PinId),
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPin(pin) => write!(f, "pin {pin} is not in the configured enumeration"),
        }
    }
}

impl From<PinError> for Error {
    fn from(e: PinError) -> Self {
        Self::Pin(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// The pin could not be configured as an output.
    SetupFailed(PinId),
    /// Writing the output level failed.
    WriteFailed(PinId),
    /// The GPIO bank has no line for this pin (not initialised or released).
    NotConfigured(PinId),
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetupFailed(pin) => write!(f, "setup of pin {pin} failed"),
            Self::WriteFailed(pin) => write!(f, "write to pin {pin} failed"),
            Self::NotConfigured(pin) => write!(f, "pin {pin} is not configured as an output"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Serial errors
// ---------------------------------------------------------------------------

/// Port-level serial failures.  A read timeout is *not* an error; line
/// sources report it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialError {
    /// Opening (or re-opening) the device failed.
    Open(String),
    /// A read was attempted while the port is closed.
    NotOpen,
    /// The device reported an I/O error mid-read (e.g. unplugged).
    Io(String),
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(msg) => write!(f, "open failed: {msg}"),
            Self::NotOpen => write!(f, "port not open"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl From<SerialError> for Error {
    fn from(e: SerialError) -> Self {
        Self::Serial(e)
    }
}

// ---------------------------------------------------------------------------
// Upload errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The platform answered with a non-2xx status.
    Status(u16),
    /// The request never completed (DNS, TLS, connect, timeout).
    Transport(String),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "platform replied with status {code}"),
            Self::Transport(msg) => write!(f, "request failed: {msg}"),
        }
    }
}

impl From<UploadError> for Error {
    fn from(e: UploadError) -> Self {
        Self::Upload(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommsError {
    /// The broker refused or dropped the initial connection.
    ConnectFailed(String),
    /// An outbound publish could not be queued.
    PublishFailed(String),
    /// The subscription request could not be queued.
    SubscribeFailed(String),
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed(msg) => write!(f, "broker connect failed: {msg}"),
            Self::PublishFailed(msg) => write!(f, "publish failed: {msg}"),
            Self::SubscribeFailed(msg) => write!(f, "subscribe failed: {msg}"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Gateway-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
