//! Serial sensor-board link: reconnect policy and the ingest loop.

pub mod backoff;
pub mod ingest;
