//! Serial ingest loop: lines in, telemetry uploads out.
//!
//! ```text
//!            read error                    reopen ok
//!   Open ──────────────▶ Reconnecting ─────────────────▶ Open
//!    ▲                        │
//!    │                        │ reopen failed (wait retry_delay)
//!    │    reopen ok           ▼
//!    └────────────────── Closed ──▶ Reconnecting (next step)
//! ```
//!
//! Every step ends with the poll delay.  Reconnect attempts are unbounded.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::{ClockPort, EventSink, LineSource, TelemetryPort};
use crate::config::GatewayConfig;
use crate::error::UploadError;
use crate::telemetry::sample::{LineError, parse_line};
use crate::telemetry::uploader::{Ack, TelemetryUploader};

use super::backoff::{self, ReconnectPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialConnectionState {
    Open,
    Closed,
    Reconnecting,
}

/// What one [`SerialIngestLoop::step`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Timeout or blank line.
    Idle,
    Uploaded(Ack),
    UploadFailed(UploadError),
    Rejected(LineError),
    Reconnected,
    ReconnectFailed,
}

/// Line framing and pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSettings {
    pub delimiter: char,
    pub poll_delay: Duration,
}

impl IngestSettings {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            delimiter: config.field_delimiter,
            poll_delay: Duration::from_millis(config.poll_delay_ms.into()),
        }
    }
}

pub struct SerialIngestLoop<S, T, C, D, P> {
    source: S,
    uploader: TelemetryUploader<T>,
    clock: C,
    delay: D,
    policy: P,
    settings: IngestSettings,
    state: SerialConnectionState,
}

impl<S, T, C, D, P> SerialIngestLoop<S, T, C, D, P>
where
    S: LineSource,
    T: TelemetryPort,
    C: ClockPort,
    D: DelayNs,
    P: ReconnectPolicy,
{
    /// `source` must already be open.
    pub fn new(
        source: S,
        uploader: TelemetryUploader<T>,
        clock: C,
        delay: D,
        policy: P,
        settings: IngestSettings,
    ) -> Self {
        Self {
            source,
            uploader,
            clock,
            delay,
            policy,
            settings,
            state: SerialConnectionState::Open,
        }
    }

    /// Run one iteration.
    pub fn step(&mut self, sink: &mut impl EventSink) -> StepOutcome {
        let outcome = match self.state {
            SerialConnectionState::Open => match self.source.read_line() {
                Ok(None) => StepOutcome::Idle,
                Ok(Some(line)) => self.handle_line(&line, sink),
                Err(e) => {
                    sink.emit(&AppEvent::SerialFault(e));
                    self.reconnect(sink)
                }
            },
            SerialConnectionState::Closed | SerialConnectionState::Reconnecting => {
                self.reconnect(sink)
            }
        };
        backoff::wait(&mut self.delay, self.settings.poll_delay);
        outcome
    }

    /// Step until `shutdown` is raised.  The flag is checked between
    /// iterations, never mid-step.
    pub fn run(&mut self, shutdown: &AtomicBool, sink: &mut impl EventSink) {
        info!("Serial ingest started");
        while !shutdown.load(Ordering::Acquire) {
            self.step(sink);
        }
        info!("Serial ingest stopped");
    }

    /// Close the port.  The loop reopens it on the next step.
    pub fn close(&mut self) {
        self.source.close();
        self.state = SerialConnectionState::Closed;
    }

    pub fn state(&self) -> SerialConnectionState {
        self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn uploader(&self) -> &TelemetryUploader<T> {
        &self.uploader
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    fn handle_line(&mut self, bytes: &[u8], sink: &mut impl EventSink) -> StepOutcome {
        let parsed = match core::str::from_utf8(bytes) {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return StepOutcome::Idle;
                }
                debug!("Serial line: {}", text);
                parse_line(text, self.settings.delimiter)
            }
            Err(_) => Err(LineError::NotText),
        };

        let sample = match parsed {
            Ok(sample) => sample,
            Err(e) => {
                sink.emit(&AppEvent::LineRejected(e.clone()));
                return StepOutcome::Rejected(e);
            }
        };

        let ts = self.clock.now_millis();
        match self.uploader.upload(&sample, ts) {
            Ok(ack) => {
                sink.emit(&AppEvent::SampleUploaded {
                    ts,
                    status: ack.status,
                });
                StepOutcome::Uploaded(ack)
            }
            Err(e) => {
                sink.emit(&AppEvent::UploadFailed(e.clone()));
                StepOutcome::UploadFailed(e)
            }
        }
    }

    fn reconnect(&mut self, sink: &mut impl EventSink) -> StepOutcome {
        self.transition(SerialConnectionState::Reconnecting, sink);
        backoff::wait(&mut self.delay, self.policy.reopen_delay());

        self.source.close();
        match self.source.reopen() {
            Ok(()) => {
                self.transition(SerialConnectionState::Open, sink);
                StepOutcome::Reconnected
            }
            Err(e) => {
                sink.emit(&AppEvent::SerialFault(e));
                self.transition(SerialConnectionState::Closed, sink);
                backoff::wait(&mut self.delay, self.policy.retry_delay());
                StepOutcome::ReconnectFailed
            }
        }
    }

    fn transition(&mut self, to: SerialConnectionState, sink: &mut impl EventSink) {
        if self.state != to {
            let from = self.state;
            self.state = to;
            sink.emit(&AppEvent::SerialStateChanged { from, to });
        }
    }
}
