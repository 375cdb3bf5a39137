//! Pure encode/decode functions for the per-field codecs.
//!
//! All multi-byte values on the wire are little-endian. The codec set is
//! closed: new kinds require a deliberate extension of [`CodecKind`] and both
//! dispatch tables, never ad hoc type probing.

use crate::error::BtError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds between the unix epoch and the device epoch, 2005-01-01T00:00:00Z.
const DEVICE_EPOCH_UNIX: i64 = 1_104_537_600;

/// Temperature reported for an unplugged or out-of-range probe.
pub const TEMPERATURE_SENTINEL: f64 = -300.0;

/// The closed set of codec kinds a field can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodecKind {
    /// Unsigned 8-bit.
    Byte,
    /// Unsigned 16-bit.
    Word,
    /// Unsigned 32-bit.
    Integer,
    /// ASCII bytes up to (and excluding) the first NUL. Decode only.
    String,
    /// `(raw / 100_000.0) - 300.0` celsius, with sentinel handling. Decode only.
    Temperature,
    /// Device epoch (2005-01-01 UTC) plus raw seconds. Decode only.
    Date,
    /// `raw / 1000.0` volts. Decode only.
    Battery,
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Byte(u8),
    Word(u16),
    Integer(u32),
    Text(String),
    /// Celsius; −300.0 is the unplugged-probe sentinel.
    Temperature(f64),
    Timestamp(DateTime<Utc>),
    /// Volts.
    Battery(f64),
}

impl Value {
    /// Celsius reading, if this value is a temperature.
    pub fn as_temperature(&self) -> Option<f64> {
        match self {
            Value::Temperature(t) => Some(*t),
            _ => None,
        }
    }

    /// Widened integer form of byte/word/integer values.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Byte(v) => Some(u32::from(*v)),
            Value::Word(v) => Some(u32::from(*v)),
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_battery(&self) -> Option<f64> {
        match self {
            Value::Battery(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Byte(v) => write!(f, "{v}"),
            Value::Word(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Temperature(t) => write!(f, "{t:.2} °C"),
            Value::Timestamp(t) => write!(f, "{t}"),
            Value::Battery(v) => write!(f, "{v:.3} V"),
        }
    }
}

/// Decode `bytes` (a field's exact byte range) with the given codec.
///
/// Total over any slice: numeric kinds read at most their width in
/// little-endian order, strings stop at the first NUL.
pub fn decode(kind: CodecKind, bytes: &[u8]) -> Value {
    match kind {
        CodecKind::Byte => Value::Byte(le(bytes) as u8),
        CodecKind::Word => Value::Word(le(bytes) as u16),
        CodecKind::Integer => Value::Integer(le(bytes)),
        CodecKind::String => {
            let text = bytes
                .iter()
                .take_while(|&&b| b != 0)
                .map(|&b| b as char)
                .collect();
            Value::Text(text)
        }
        CodecKind::Temperature => Value::Temperature(decode_temperature(le(bytes))),
        CodecKind::Date => Value::Timestamp(decode_date(le(bytes))),
        CodecKind::Battery => Value::Battery(f64::from(le(bytes)) / 1000.0),
    }
}

/// Encode `value` into `width` little-endian bytes.
///
/// Defined only for the byte/word/integer kinds; the device is read-mostly
/// for everything else, and asking for an unsupported encode is a programming
/// error rather than something to truncate silently.
pub fn encode(kind: CodecKind, value: u32, width: usize) -> Result<Vec<u8>, BtError> {
    match kind {
        CodecKind::Byte | CodecKind::Word | CodecKind::Integer => {
            Ok((0..width).map(|i| (value >> (i * 8)) as u8).collect())
        }
        CodecKind::String | CodecKind::Temperature | CodecKind::Date | CodecKind::Battery => {
            Err(BtError::UnsupportedEncode(kind))
        }
    }
}

/// Raw integer to celsius. Zero and the top three raw values are sentinels
/// for an unplugged probe and decode to exactly −300.0.
pub fn decode_temperature(raw: u32) -> f64 {
    if raw == 0 || raw >= 0xFFFF_FFFD {
        TEMPERATURE_SENTINEL
    } else {
        f64::from(raw) / 100_000.0 - 300.0
    }
}

fn decode_date(raw: u32) -> DateTime<Utc> {
    // Always in range for a u32 offset from 2005.
    DateTime::from_timestamp(DEVICE_EPOCH_UNIX + i64::from(raw), 0).unwrap_or_default()
}

fn le(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take(4)
        .enumerate()
        .fold(0u32, |acc, (i, &b)| acc | (u32::from(b) << (i * 8)))
}
