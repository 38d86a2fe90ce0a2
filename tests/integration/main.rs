//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below exercises one subsystem against the mock adapters in
//! `mock_hw`.  Nothing touches real GPIO, a broker, a serial device or
//! the network, and no test sleeps.

mod dispatcher_tests;
mod mock_hw;
mod worker_tests;
