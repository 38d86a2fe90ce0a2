//! Application core: pin state, commands, events and port traits.
//!
//! Nothing in here performs I/O.  All interaction with GPIO, the broker,
//! the serial device and the HTTP platform happens through **port traits**
//! defined in [`ports`], keeping the core testable without real peripherals.

pub mod commands;
pub mod events;
pub mod pin_state;
pub mod ports;
