//! Serial line parsing into telemetry samples.
//!
//! Wire format (one reading set per line, ASCII):
//! ```text
//! <distance>x<humidity>x<temperature>x<light>x<waterlevel>[x<extra>...]\n
//! ```
//!
//! Every field must parse as a finite float.  At least five fields are
//! required; the first five map positionally and trailing ones are ignored.

use core::fmt;

use serde::Serialize;

/// Number of positional readings in a sample.
pub const SAMPLE_ARITY: usize = 5;

/// One parsed set of sensor readings, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetrySample {
    pub distance: f64,
    pub humidity: f64,
    pub temperature: f64,
    pub light: f64,
    pub waterlevel: f64,
}

impl TelemetrySample {
    /// Build from the first five values of `fields`.
    fn from_fields(fields: &[f64]) -> Option<Self> {
        match *fields {
            [distance, humidity, temperature, light, waterlevel, ..] => Some(Self {
                distance,
                humidity,
                temperature,
                light,
                waterlevel,
            }),
            _ => None,
        }
    }
}

/// Why a line produced no sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// The bytes are not valid UTF-8.
    NotText,
    /// A field is not a number.
    InvalidField { index: usize, text: String },
    /// A field parsed to NaN or infinity.
    NonFinite { index: usize },
    /// Fewer than [`SAMPLE_ARITY`] fields.
    TooFewFields { found: usize },
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotText => write!(f, "line is not valid text"),
            Self::InvalidField { index, text } => {
                write!(f, "field {index} ({text:?}) is not a number")
            }
            Self::NonFinite { index } => write!(f, "field {index} is not finite"),
            Self::TooFewFields { found } => {
                write!(f, "{found} fields found, {SAMPLE_ARITY} expected")
            }
        }
    }
}

/// Parse one trimmed, non-empty line.
pub fn parse_line(line: &str, delimiter: char) -> Result<TelemetrySample, LineError> {
    let mut values = Vec::with_capacity(SAMPLE_ARITY);
    for (index, field) in line.split(delimiter).enumerate() {
        let text = field.trim();
        let value: f64 = text.parse().map_err(|_| LineError::InvalidField {
            index,
            text: text.to_owned(),
        })?;
        if !value.is_finite() {
            return Err(LineError::NonFinite { index });
        }
        values.push(value);
    }
    TelemetrySample::from_fields(&values).ok_or(LineError::TooFewFields {
        found: values.len(),
    })
}
