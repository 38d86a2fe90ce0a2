//! ThingsBoard edge gateway library.
//!
//! Exposes the domain core (pin state, RPC dispatch, serial ingest,
//! telemetry upload) and its adapters for integration testing.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod pins;
pub mod rpc;
pub mod serial;
pub mod supervisor;
pub mod telemetry;
