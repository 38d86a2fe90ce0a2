//! Sensor telemetry: line parsing and platform upload.

pub mod sample;
pub mod uploader;
