//! One-shot telemetry upload.
//!
//! Payload:
//! ```json
//! {"ts": 1718000000000,
//!  "values": {"distance": 12.5, "humidity": 45.0, "temperature": 23.1,
//!             "light": 300.0, "waterlevel": 80.0}}
//! ```
//!
//! Fire-and-forget: a non-2xx reply or transport failure is returned,
//! never retried or queued.  The caller reports the outcome; only the
//! platform's rejection text is logged here, since nothing else sees it.

use log::warn;
use serde::Serialize;

use crate::app::ports::TelemetryPort;
use crate::error::UploadError;

use super::sample::TelemetrySample;

#[derive(Serialize)]
struct TelemetryPayload<'a> {
    ts: u64,
    values: &'a TelemetrySample,
}

/// The platform accepted the sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub status: u16,
}

pub struct TelemetryUploader<T> {
    port: T,
    url: String,
}

impl<T: TelemetryPort> TelemetryUploader<T> {
    pub fn new(port: T, url: impl Into<String>) -> Self {
        Self {
            port,
            url: url.into(),
        }
    }

    /// JSON body for `sample` stamped at `ts` (epoch milliseconds).
    pub fn payload(sample: &TelemetrySample, ts: u64) -> Vec<u8> {
        let body = TelemetryPayload { ts, values: sample };
        // A struct of finite floats and an integer always serialises.
        serde_json::to_vec(&body).unwrap_or_default()
    }

    pub fn upload(&mut self, sample: &TelemetrySample, ts: u64) -> Result<Ack, UploadError> {
        let body = Self::payload(sample, ts);
        match self.port.post_json(&self.url, body) {
            Ok(reply) if (200..300).contains(&reply.status) => Ok(Ack {
                status: reply.status,
            }),
            Ok(reply) => {
                warn!("Telemetry rejected ({}): {}", reply.status, reply.body);
                Err(UploadError::Status(reply.status))
            }
            Err(e) => Err(e),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn port(&self) -> &T {
        &self.port
    }
}
