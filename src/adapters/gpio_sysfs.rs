//! Linux sysfs GPIO output line (`/sys/class/gpio`).
//!
//! Implements [`embedded_hal::digital::OutputPin`] so the pin bank can
//! drive real lines and test doubles the same way.  A line exported by
//! [`SysfsOutputPin::open`] is unexported again on drop.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use log::debug;

/// Polls while waiting for the kernel to create `gpioN/` after export.
const EXPORT_POLLS: u32 = 10;
const EXPORT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsGpioError {
    pub line: u32,
    pub op: &'static str,
    pub detail: String,
}

impl core::fmt::Display for SysfsGpioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "gpio{} {}: {}", self.line, self.op, self.detail)
    }
}

impl std::error::Error for SysfsGpioError {}

impl embedded_hal::digital::Error for SysfsGpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Debug)]
pub struct SysfsOutputPin {
    base: PathBuf,
    line: u32,
    exported: bool,
}

impl SysfsOutputPin {
    /// Export `line` under `base` if needed and set its direction to `out`.
    pub fn open(base: impl AsRef<Path>, line: u32) -> Result<Self, SysfsGpioError> {
        let base = base.as_ref().to_path_buf();
        let mut pin = Self {
            base,
            line,
            exported: false,
        };

        if !pin.dir().exists() {
            pin.write(&pin.base.join("export"), &line.to_string(), "export")?;
            pin.exported = true;
            for _ in 0..EXPORT_POLLS {
                if pin.dir().exists() {
                    break;
                }
                std::thread::sleep(EXPORT_POLL_INTERVAL);
            }
        }

        pin.write(&pin.dir().join("direction"), "out", "direction")?;
        debug!("gpio{} configured as output", line);
        Ok(pin)
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    fn dir(&self) -> PathBuf {
        self.base.join(format!("gpio{}", self.line))
    }

    fn write(&self, path: &Path, value: &str, op: &'static str) -> Result<(), SysfsGpioError> {
        fs::write(path, value).map_err(|e| SysfsGpioError {
            line: self.line,
            op,
            detail: e.to_string(),
        })
    }
}

impl ErrorType for SysfsOutputPin {
    type Error = SysfsGpioError;
}

impl OutputPin for SysfsOutputPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(&self.dir().join("value"), "0", "write")
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(&self.dir().join("value"), "1", "write")
    }
}

impl Drop for SysfsOutputPin {
    fn drop(&mut self) {
        if self.exported {
            let _ = fs::write(self.base.join("unexport"), self.line.to_string());
        }
    }
}
