//! Mock adapters for integration tests.
//!
//! Record every port call so tests can assert on the full history
//! without touching GPIO lines, a broker, a serial device or the network.

use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};

use embedded_hal::delay::DelayNs;
use tbgateway::app::events::AppEvent;
use tbgateway::app::ports::{
    BrokerPort, ClockPort, EventSink, GpioPort, HttpReply, LineBuf, LineSource, Qos,
    TelemetryPort,
};
use tbgateway::error::{ActuatorError, CommsError, SerialError, UploadError};
use tbgateway::pins::PinId;

// ── GPIO ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpioCall {
    Setup(PinId),
    Set(PinId, bool),
    Release,
}

#[derive(Default)]
pub struct MockGpio {
    pub calls: Vec<GpioCall>,
    /// Pins whose writes fail.
    pub failing: BTreeSet<PinId>,
}

#[allow(dead_code)]
impl MockGpio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(pins: &[u16]) -> Self {
        Self {
            calls: Vec::new(),
            failing: pins.iter().copied().map(PinId::new).collect(),
        }
    }

    pub fn writes(&self) -> Vec<(PinId, bool)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GpioCall::Set(pin, level) => Some((*pin, *level)),
                _ => None,
            })
            .collect()
    }
}

impl GpioPort for MockGpio {
    fn setup_output(&mut self, pin: PinId) -> Result<(), ActuatorError> {
        self.calls.push(GpioCall::Setup(pin));
        if self.failing.contains(&pin) {
            return Err(ActuatorError::SetupFailed(pin));
        }
        Ok(())
    }

    fn set_output(&mut self, pin: PinId, level: bool) -> Result<(), ActuatorError> {
        self.calls.push(GpioCall::Set(pin, level));
        if self.failing.contains(&pin) {
            return Err(ActuatorError::WriteFailed(pin));
        }
        Ok(())
    }

    fn release(&mut self) {
        self.calls.push(GpioCall::Release);
    }
}

// ── Broker ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: Qos,
}

/// Broker whose log is shared, so it can be inspected after the
/// dispatcher has moved to another thread.
#[derive(Clone, Default)]
pub struct MockBroker {
    pub log: Arc<Mutex<Vec<Published>>>,
    /// Topics whose publishes fail.
    pub failing: Arc<Mutex<BTreeSet<String>>>,
}

#[allow(dead_code)]
impl MockBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_topic(&self, topic: &str) {
        self.failing.lock().unwrap().insert(topic.to_owned());
    }

    pub fn published(&self) -> Vec<Published> {
        self.log.lock().unwrap().clone()
    }
}

impl BrokerPort for MockBroker {
    fn publish(&mut self, topic: &str, payload: Vec<u8>, qos: Qos) -> Result<(), CommsError> {
        if self.failing.lock().unwrap().contains(topic) {
            return Err(CommsError::PublishFailed("broker offline".into()));
        }
        self.log.lock().unwrap().push(Published {
            topic: topic.to_owned(),
            payload,
            qos,
        });
        Ok(())
    }
}

// ── Serial line source ────────────────────────────────────────

pub enum Read {
    Line(Vec<u8>),
    Timeout,
    Fail,
}

#[allow(dead_code)]
impl Read {
    pub fn text(s: &str) -> Self {
        Self::Line(s.as_bytes().to_vec())
    }
}

#[derive(Default)]
pub struct ScriptedLines {
    pub reads: VecDeque<Read>,
    /// Outcome of each reopen; exhausted means success.
    pub reopens: VecDeque<bool>,
    pub reopen_calls: usize,
    pub close_calls: usize,
}

#[allow(dead_code)]
impl ScriptedLines {
    pub fn new(reads: Vec<Read>) -> Self {
        Self {
            reads: reads.into(),
            ..Self::default()
        }
    }

    pub fn with_reopens(mut self, outcomes: &[bool]) -> Self {
        self.reopens = outcomes.iter().copied().collect();
        self
    }
}

impl LineSource for ScriptedLines {
    fn read_line(&mut self) -> Result<Option<LineBuf>, SerialError> {
        match self.reads.pop_front() {
            Some(Read::Line(bytes)) => Ok(Some(LineBuf::from_slice(&bytes).unwrap())),
            Some(Read::Timeout) | None => Ok(None),
            Some(Read::Fail) => Err(SerialError::Io("device unplugged".into())),
        }
    }

    fn reopen(&mut self) -> Result<(), SerialError> {
        self.reopen_calls += 1;
        if self.reopens.pop_front().unwrap_or(true) {
            Ok(())
        } else {
            Err(SerialError::Open("no such device".into()))
        }
    }

    fn close(&mut self) {
        self.close_calls += 1;
    }
}

// ── Telemetry endpoint ────────────────────────────────────────

pub struct MockTelemetry {
    pub posts: Vec<(String, serde_json::Value)>,
    /// Replies handed out in order; exhausted means 200.
    pub replies: VecDeque<Result<HttpReply, UploadError>>,
}

#[allow(dead_code)]
impl MockTelemetry {
    pub fn new() -> Self {
        Self {
            posts: Vec::new(),
            replies: VecDeque::new(),
        }
    }

    pub fn replying(replies: Vec<Result<HttpReply, UploadError>>) -> Self {
        Self {
            posts: Vec::new(),
            replies: replies.into(),
        }
    }

    pub fn status(status: u16) -> Result<HttpReply, UploadError> {
        Ok(HttpReply {
            status,
            body: String::new(),
        })
    }
}

impl TelemetryPort for MockTelemetry {
    fn post_json(&mut self, url: &str, body: Vec<u8>) -> Result<HttpReply, UploadError> {
        let json = serde_json::from_slice(&body).unwrap();
        self.posts.push((url.to_owned(), json));
        self.replies.pop_front().unwrap_or(Self::status(200))
    }
}

// ── Clock / delay ─────────────────────────────────────────────

pub struct FixedClock(pub u64);

impl ClockPort for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

/// Records requested delays in milliseconds instead of sleeping.
#[derive(Default)]
pub struct RecordingDelay {
    pub waits_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits_ms.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
