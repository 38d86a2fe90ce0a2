//! JSON configuration file adapter.
//!
//! Missing fields take their built-in defaults (`#[serde(default)]` on
//! [`GatewayConfig`]).

use std::io::ErrorKind;
use std::path::PathBuf;

use crate::app::ports::ConfigPort;
use crate::config::{ConfigError, GatewayConfig};

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<GatewayConfig, ConfigError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound(self.path.display().to_string()),
            _ => ConfigError::Io(e.to_string()),
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
