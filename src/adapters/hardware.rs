//! Hardware adapter: bridges output lines to the [`GpioPort`] trait.
//!
//! Owns one [`OutputPin`] per configured pin.  Lines are opened lazily by
//! `setup_output` through a caller-supplied opener, so the same bank
//! drives sysfs lines in production and in-memory pins under test.

use std::collections::BTreeMap;
use std::path::PathBuf;

use embedded_hal::digital::{Error as _, OutputPin, PinState};
use log::{info, warn};

use crate::app::ports::GpioPort;
use crate::config::GatewayConfig;
use crate::error::ActuatorError;
use crate::pins::PinId;

use super::gpio_sysfs::SysfsOutputPin;

/// Opens the line behind a pin.
pub type PinOpener<P> = Box<dyn FnMut(PinId) -> Result<P, ActuatorError> + Send>;

/// Production bank: sysfs lines, pins remapped by `gpio_lines`.
pub type SysfsPinBank = OutputPinBank<SysfsOutputPin>;

pub struct OutputPinBank<P> {
    open: PinOpener<P>,
    lines: BTreeMap<PinId, P>,
}

impl<P: OutputPin> OutputPinBank<P> {
    pub fn new(open: PinOpener<P>) -> Self {
        Self {
            open,
            lines: BTreeMap::new(),
        }
    }

    /// Pins currently configured as outputs.
    pub fn configured(&self) -> impl Iterator<Item = PinId> + '_ {
        self.lines.keys().copied()
    }

    pub fn line(&self, pin: PinId) -> Option<&P> {
        self.lines.get(&pin)
    }
}

impl SysfsPinBank {
    pub fn from_config(config: &GatewayConfig) -> Self {
        let base = PathBuf::from(&config.gpio_sysfs_path);
        let config = config.clone();
        Self::new(Box::new(move |pin| {
            let line = config.gpio_line(pin);
            SysfsOutputPin::open(&base, line).map_err(|e| {
                warn!("GPIO {}: {}", pin, e);
                ActuatorError::SetupFailed(pin)
            })
        }))
    }
}

impl<P: OutputPin> GpioPort for OutputPinBank<P> {
    fn setup_output(&mut self, pin: PinId) -> Result<(), ActuatorError> {
        if !self.lines.contains_key(&pin) {
            let line = (self.open)(pin)?;
            self.lines.insert(pin, line);
        }
        Ok(())
    }

    fn set_output(&mut self, pin: PinId, level: bool) -> Result<(), ActuatorError> {
        let line = self
            .lines
            .get_mut(&pin)
            .ok_or(ActuatorError::NotConfigured(pin))?;
        line.set_state(PinState::from(level)).map_err(|e| {
            warn!("GPIO {} write failed: {:?}", pin, e.kind());
            ActuatorError::WriteFailed(pin)
        })
    }

    fn release(&mut self) {
        for (pin, line) in &mut self.lines {
            if let Err(e) = line.set_low() {
                warn!("GPIO {} release failed: {:?}", pin, e.kind());
            }
        }
        let count = self.lines.len();
        self.lines.clear();
        info!("GPIO released ({} lines)", count);
    }
}
