//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events
//! through the `log` facade (`env_logger` on stderr in production).

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::RpcResponded { method, topic } => {
                info!("RPC   | {} -> {}", method, topic);
            }
            AppEvent::RpcDropped(reason) => {
                warn!("RPC   | dropped: {}", reason);
            }
            AppEvent::PinChanged { pin, level } => {
                info!("GPIO  | pin {} -> {}", pin, if *level { "HIGH" } else { "LOW" });
            }
            AppEvent::AttributesPublished { topic } => {
                debug!("ATTR  | snapshot published on {}", topic);
            }
            AppEvent::PublishFailed { topic, error } => {
                warn!("MQTT  | publish to {} failed: {}", topic, error);
            }
            AppEvent::GpioFault(e) => {
                warn!("GPIO  | {}", e);
            }
            AppEvent::LineRejected(e) => {
                warn!("SERIAL| malformed line: {}", e);
            }
            AppEvent::SampleUploaded { ts, status } => {
                info!("TELEM | ts={} status={}", ts, status);
            }
            AppEvent::UploadFailed(e) => {
                warn!("TELEM | sample lost: {}", e);
            }
            AppEvent::SerialStateChanged { from, to } => {
                info!("SERIAL| {:?} -> {:?}", from, to);
            }
            AppEvent::SerialFault(e) => {
                warn!("SERIAL| {}", e);
            }
        }
    }
}
