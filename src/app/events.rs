//! Outbound application events.
//!
//! The dispatcher and the ingest loop emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; in production they become log lines.

use crate::error::{CommsError, Error, SerialError, UploadError};
use crate::pins::PinId;
use crate::rpc::dispatcher::DropReason;
use crate::serial::ingest::SerialConnectionState;
use crate::telemetry::sample::LineError;

/// Structured events emitted by the gateway core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// An RPC response was published on `topic`.
    RpcResponded { method: &'static str, topic: String },

    /// An inbound RPC produced no response.
    RpcDropped(DropReason),

    /// A pin was driven and recorded.
    PinChanged { pin: PinId, level: bool },

    /// The post-update snapshot was published as device attributes.
    AttributesPublished { topic: String },

    /// An outbound publish failed; nothing is retried.
    PublishFailed { topic: String, error: CommsError },

    /// A pin could not be configured or released.
    GpioFault(Error),

    /// A serial line was rejected before producing a sample.
    LineRejected(LineError),

    /// A sample reached the platform.
    SampleUploaded { ts: u64, status: u16 },

    /// A sample was lost.
    UploadFailed(UploadError),

    /// The serial link changed state.
    SerialStateChanged {
        from: SerialConnectionState,
        to: SerialConnectionState,
    },

    /// A port-level serial failure triggered recovery.
    SerialFault(SerialError),
}
