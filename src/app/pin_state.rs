//! Pin-state store: single source of truth for output levels.
//!
//! Created with every enumerated pin at `false`.  Mutated only through
//! [`PinStateStore::set_pin`] (or [`PinStateStore::apply`], which writes
//! the hardware first and records only on success).  Identifiers outside
//! the enumeration are rejected, never inserted.
//!
//! The map sits behind an `embassy-sync` blocking mutex so the RPC worker
//! and the supervisor can share it through an `Arc`.

use core::cell::RefCell;
use std::collections::BTreeMap;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::error::{Error, PinError};
use crate::pins::PinId;

use super::ports::GpioPort;

/// Full pin → level mapping at one point in time.
///
/// Serialises to `{"7": false, "11": true, ...}` in ascending pin order.
pub type PinSnapshot = BTreeMap<PinId, bool>;

pub struct PinStateStore {
    state: Mutex<CriticalSectionRawMutex, RefCell<PinSnapshot>>,
}

impl PinStateStore {
    /// Build the store for a fixed enumeration, every pin LOW.
    pub fn new(pins: &[PinId]) -> Self {
        let initial = pins.iter().map(|&p| (p, false)).collect();
        Self {
            state: Mutex::new(RefCell::new(initial)),
        }
    }

    /// Whether `pin` belongs to the enumeration.
    pub fn contains(&self, pin: PinId) -> bool {
        self.state.lock(|s| s.borrow().contains_key(&pin))
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> PinSnapshot {
        self.state.lock(|s| s.borrow().clone())
    }

    /// Record `value` for `pin`.
    pub fn set_pin(&self, pin: PinId, value: bool) -> Result<(), PinError> {
        self.state.lock(|s| match s.borrow_mut().get_mut(&pin) {
            Some(level) => {
                *level = value;
                Ok(())
            }
            None => Err(PinError::UnknownPin(pin)),
        })
    }

    /// Validate, drive the output, then record.
    ///
    /// Unknown pins never reach the GPIO port.  A failed write leaves the
    /// recorded level untouched.
    pub fn apply(&self, pin: PinId, value: bool, gpio: &mut impl GpioPort) -> Result<(), Error> {
        if !self.contains(pin) {
            return Err(PinError::UnknownPin(pin).into());
        }
        gpio.set_output(pin, value)?;
        self.set_pin(pin, value)?;
        Ok(())
    }
}
