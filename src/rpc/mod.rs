//! RPC subsystem: broker requests in, pin-state snapshots out.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      RPC Stack                             │
//! │                                                            │
//! │  ┌──────────┐   ┌──────────┐   ┌───────────────────────┐   │
//! │  │  Broker  │──▶│ Envelope │──▶│  Dispatcher           │   │
//! │  │ (io_task)│   │ (decode) │   │  → PinStateStore/GPIO │   │
//! │  └──────────┘   └──────────┘   └───────────────────────┘   │
//! │       ▲                                    │               │
//! │       └────────────────────────────────────┘               │
//! │              response + attributes publish                 │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod channels;
pub mod dispatcher;
pub mod envelope;
pub mod io_task;
