//! Parsing of the colon-delimited telemetry payload sent by devices.
//!
//! Wire form: `<device_id>:<unix_millis>:'Temperature':<temperature>`

use chrono::{DateTime, Utc};
use derive_more::{Display, Error};

/// Literal key expected in the third field, quotes included.
pub const TEMPERATURE_KEY: &str = "'Temperature'";

const MILLIS_PER_SECOND: i64 = 1_000;
const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Reasons a raw submission is rejected. All of them end up as the same
/// "bad request" for the client, the variant only shows up in the logs.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[display("expected 4 ':'-separated fields, got {parts}")]
    MalformedStructure { parts: usize },
    #[display("device id {value:?} is not an integer")]
    InvalidDeviceId { value: String },
    #[display("timestamp {value:?} is not a valid unix millisecond value")]
    InvalidTimestamp { value: String },
    #[display("expected key 'Temperature', got {value:?}")]
    TemperatureKeyMissing { value: String },
    #[display("temperature {value:?} is not a number")]
    InvalidTemperature { value: String },
}

/// A validated telemetry reading. Only [`parse`] builds one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryRecord {
    device_id: i32,
    timestamp: DateTime<Utc>,
    temperature: f64,
}

impl TelemetryRecord {
    pub fn device_id(&self) -> i32 {
        self.device_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}

/// Parses a raw submission into a [`TelemetryRecord`].
///
/// Fields are checked in wire order and the first failure wins, so a payload
/// with both a bad device id and a bad temperature reports `InvalidDeviceId`.
pub fn parse(raw: &str) -> Result<TelemetryRecord, ParseError> {
    let fields: Vec<&str> = raw.split(':').collect();
    let [device_id, timestamp, key, temperature] = fields.as_slice() else {
        return Err(ParseError::MalformedStructure {
            parts: fields.len(),
        });
    };

    let device_id = parse_device_id(device_id)?;
    let timestamp = parse_timestamp(timestamp)?;
    if *key != TEMPERATURE_KEY {
        return Err(ParseError::TemperatureKeyMissing {
            value: (*key).to_owned(),
        });
    }
    let temperature = parse_temperature(temperature)?;

    Ok(TelemetryRecord {
        device_id,
        timestamp,
        temperature,
    })
}

/// Device ids are read as 64-bit and narrowed, values outside i32 wrap around.
fn parse_device_id(field: &str) -> Result<i32, ParseError> {
    field
        .parse::<i64>()
        .map(|id| id as i32)
        .map_err(|_| ParseError::InvalidDeviceId {
            value: field.to_owned(),
        })
}

/// Whole seconds come from `millis / 1000`. The remainder is handed to the
/// nanosecond argument as-is, it is not scaled up to nanoseconds.
fn parse_timestamp(field: &str) -> Result<DateTime<Utc>, ParseError> {
    let invalid = || ParseError::InvalidTimestamp {
        value: field.to_owned(),
    };
    let millis: i64 = field.parse().map_err(|_| invalid())?;

    let mut seconds = millis / MILLIS_PER_SECOND;
    let mut nanos = millis % MILLIS_PER_SECOND;
    if nanos < 0 {
        seconds -= 1;
        nanos += NANOS_PER_SECOND;
    }

    // chrono stops at roughly +/-262,000 years, anything past that has no
    // calendar date to format and is rejected here
    DateTime::from_timestamp(seconds, nanos as u32).ok_or_else(invalid)
}

fn parse_temperature(field: &str) -> Result<f64, ParseError> {
    let invalid = || ParseError::InvalidTemperature {
        value: field.to_owned(),
    };
    let temperature = field
        .parse::<f64>()
        .ok()
        .or_else(|| parse_hex_float(field))
        .ok_or_else(invalid)?;
    // "1e400" parses to infinity, only an explicit "inf" literal may do that
    if temperature.is_infinite() && !field.to_ascii_lowercase().contains("inf") {
        return Err(invalid());
    }
    Ok(temperature)
}

/// Hexadecimal floats such as `0x1.8p6` (= 96), which `f64::from_str` does not
/// accept. The binary exponent is mandatory, digit separators are not supported.
fn parse_hex_float(field: &str) -> Option<f64> {
    let (negative, unsigned) = match field.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, field.strip_prefix('+').unwrap_or(field)),
    };
    let digits = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))?;
    let (mantissa, exponent) = digits.split_once(['p', 'P'])?;
    let exponent: i32 = exponent.parse().ok()?;
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut value = 0f64;
    for c in whole.chars().chain(fraction.chars()) {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let fraction_bits = i32::try_from(fraction.len()).ok()?.checked_mul(4)?;
    let value = value * 2f64.powi(exponent.checked_sub(fraction_bits)?);

    Some(if negative { -value } else { value })
}
