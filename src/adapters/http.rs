//! Blocking HTTP client for telemetry uploads.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::app::ports::{HttpReply, TelemetryPort};
use crate::config::GatewayConfig;
use crate::error::UploadError;

pub struct HttpTelemetry {
    client: Client,
}

impl HttpTelemetry {
    pub fn new(timeout: Duration) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, UploadError> {
        Self::new(Duration::from_secs(config.http_timeout_secs.into()))
    }
}

impl TelemetryPort for HttpTelemetry {
    fn post_json(&mut self, url: &str, body: Vec<u8>) -> Result<HttpReply, UploadError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        Ok(HttpReply { status, body })
    }
}
