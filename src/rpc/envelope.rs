//! RPC envelope decoding and response-topic derivation.
//!
//! Inbound payload:
//! ```text
//! topic:   v1/devices/me/rpc/request/<id>
//! payload: {"method": "<name>", "params": { ... }}
//! ```
//!
//! The response goes to the same path with the `request` segment swapped
//! for `response`, so the platform can correlate it by request id.

use core::fmt;

use serde::Deserialize;
use serde_json::Value;

const REQUEST_SEGMENT: &str = "request";
const RESPONSE_SEGMENT: &str = "response";

/// A decoded inbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcEnvelope {
    /// Topic the request arrived on.
    pub topic: String,
    pub method: String,
    /// `Value::Null` when the request carried no params.
    pub params: Value,
}

#[derive(Deserialize)]
struct WireEnvelope {
    method: String,
    #[serde(default)]
    params: Value,
}

/// The payload was not a JSON object with a string `method`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeError(pub String);

impl fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed RPC payload: {}", self.0)
    }
}

impl RpcEnvelope {
    pub fn decode(topic: &str, payload: &[u8]) -> Result<Self, EnvelopeError> {
        let wire: WireEnvelope =
            serde_json::from_slice(payload).map_err(|e| EnvelopeError(e.to_string()))?;
        Ok(Self {
            topic: topic.to_owned(),
            method: wire.method,
            params: wire.params,
        })
    }

    /// Look up a named parameter.  `None` if absent or if `params` is not
    /// an object.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.as_object().and_then(|m| m.get(name))
    }

    /// Where the response to this request must be published.
    pub fn response_topic(&self) -> Option<String> {
        response_topic(&self.topic)
    }
}

/// Swap the `request` path segment for `response`.
///
/// Only whole segments are matched, so an id such as `request-7` is left
/// alone.  Returns `None` when the topic has no `request` segment.
pub fn response_topic(request_topic: &str) -> Option<String> {
    let mut found = false;
    let segments: Vec<&str> = request_topic
        .split('/')
        .map(|seg| {
            if seg == REQUEST_SEGMENT {
                found = true;
                RESPONSE_SEGMENT
            } else {
                seg
            }
        })
        .collect();
    found.then(|| segments.join("/"))
}
