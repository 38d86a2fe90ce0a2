//! Inbound commands to the RPC dispatcher.
//!
//! A decoded [`RpcEnvelope`] is interpreted into one of these before
//! anything touches the pin state.  Parameter validation lives here so
//! the dispatcher only ever sees well-typed requests.

use core::fmt;

use serde_json::Value;

use crate::pins::PinId;
use crate::rpc::envelope::RpcEnvelope;

pub const METHOD_GET_GPIO_STATUS: &str = "getGpioStatus";
pub const METHOD_SET_GPIO_STATUS: &str = "setGpioStatus";

/// Requests the platform can make of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcCommand {
    /// Report the full pin-state snapshot.
    GetGpioStatus,

    /// Drive one pin and report the resulting snapshot.
    SetGpioStatus { pin: PinId, enabled: bool },
}

/// Why an envelope could not become a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    UnknownMethod(String),
    MissingParam(&'static str),
    InvalidParam(&'static str),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMethod(m) => write!(f, "unknown method {m:?}"),
            Self::MissingParam(p) => write!(f, "missing parameter '{p}'"),
            Self::InvalidParam(p) => write!(f, "parameter '{p}' has the wrong type"),
        }
    }
}

impl TryFrom<&RpcEnvelope> for RpcCommand {
    type Error = CommandError;

    fn try_from(env: &RpcEnvelope) -> Result<Self, Self::Error> {
        match env.method.as_str() {
            METHOD_GET_GPIO_STATUS => Ok(Self::GetGpioStatus),
            METHOD_SET_GPIO_STATUS => {
                let pin = match env.param("pin") {
                    None | Some(Value::Null) => return Err(CommandError::MissingParam("pin")),
                    Some(v) => v
                        .as_u64()
                        .and_then(|n| u16::try_from(n).ok())
                        .map(PinId::new)
                        .ok_or(CommandError::InvalidParam("pin"))?,
                };
                let enabled = match env.param("enabled") {
                    None | Some(Value::Null) => return Err(CommandError::MissingParam("enabled")),
                    Some(v) => v.as_bool().ok_or(CommandError::InvalidParam("enabled"))?,
                };
                Ok(Self::SetGpioStatus { pin, enabled })
            }
            other => Err(CommandError::UnknownMethod(other.to_owned())),
        }
    }
}
