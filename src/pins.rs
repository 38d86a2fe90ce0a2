//! Pin identifiers for the controllable outputs.
//!
//! Identifiers are opaque keys validated only against the configured
//! enumeration.  The default set is the header numbering the sensor
//! board wiring was documented against; whether a given identifier maps
//! to the same kernel GPIO line is decided by the GPIO adapter and its
//! `gpio_lines` remapping, never here.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a controllable output pin.
///
/// Serialises as a bare integer, and as a string when used as a JSON map
/// key (`{"7": true}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinId(u16);

impl PinId {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for PinId {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

// ---------------------------------------------------------------------------
// Default enumeration
// ---------------------------------------------------------------------------

/// The seventeen outputs exposed by default, in header numbering.
pub const DEFAULT_PINS: [u16; 17] = [
    7, 11, 12, 13, 15, 16, 18, 22, 29, 31, 32, 33, 35, 36, 37, 38, 40,
];

/// Default enumeration as typed identifiers.
pub fn default_pins() -> Vec<PinId> {
    DEFAULT_PINS.iter().copied().map(PinId::new).collect()
}
