//! Reconnect timing for the serial link.

use core::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::config::GatewayConfig;

/// How long the ingest loop waits around a reopen attempt.
pub trait ReconnectPolicy {
    /// Wait before closing and reopening a failed port.
    fn reopen_delay(&self) -> Duration;

    /// Wait after a reopen attempt failed.
    fn retry_delay(&self) -> Duration;
}

/// Constant delays, no growth between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff {
    pub reopen_delay: Duration,
    pub retry_delay: Duration,
}

impl FixedBackoff {
    pub const fn from_secs(reopen: u64, retry: u64) -> Self {
        Self {
            reopen_delay: Duration::from_secs(reopen),
            retry_delay: Duration::from_secs(retry),
        }
    }
}

impl From<&GatewayConfig> for FixedBackoff {
    fn from(config: &GatewayConfig) -> Self {
        Self::from_secs(
            config.reconnect_delay_secs.into(),
            config.reopen_retry_delay_secs.into(),
        )
    }
}

impl Default for FixedBackoff {
    fn default() -> Self {
        Self::from_secs(5, 10)
    }
}

impl ReconnectPolicy for FixedBackoff {
    fn reopen_delay(&self) -> Duration {
        self.reopen_delay
    }

    fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

/// Sleep for `d` through a HAL delay, saturating at `u32::MAX` ms.
pub fn wait(delay: &mut impl DelayNs, d: Duration) {
    let ms = u32::try_from(d.as_millis()).unwrap_or(u32::MAX);
    if ms > 0 {
        delay.delay_ms(ms);
    }
}
