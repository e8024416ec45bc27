//! Coercion helpers for heterogeneous document shapes.
//!
//! Records arrive from a document store that was written by several
//! generations of the console: creation timestamps may be RFC 3339 strings,
//! raw epoch seconds, or structured `{seconds, nanos}` objects, and company
//! notes may be a bare scalar or a list. Everything downstream of this module
//! operates on normalized in-memory types.

use chrono::{DateTime, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A point in time that deserializes from any of the shapes found in stored
/// documents and serializes back as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn epoch_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn from_epoch_seconds(seconds: i64, nanos: u32) -> Self {
        Self(DateTime::from_timestamp(seconds, nanos).unwrap_or_default())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::String(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Self(dt.with_timezone(&Utc)))
                .map_err(|e| D::Error::custom(format!("invalid timestamp string {s:?}: {e}"))),
            Value::Number(n) => {
                // Raw epoch seconds (integer or float).
                if let Some(secs) = n.as_i64() {
                    Ok(Self::from_epoch_seconds(secs, 0))
                } else if let Some(secs) = n.as_f64() {
                    let whole = secs.trunc() as i64;
                    let nanos = (secs.fract() * 1e9) as u32;
                    Ok(Self::from_epoch_seconds(whole, nanos))
                } else {
                    Err(D::Error::custom("timestamp number out of range"))
                }
            }
            Value::Object(map) => {
                let seconds = map
                    .get("seconds")
                    .or_else(|| map.get("_seconds"))
                    .and_then(Value::as_i64)
                    .ok_or_else(|| D::Error::custom("structured timestamp missing seconds"))?;
                let nanos = map
                    .get("nanos")
                    .or_else(|| map.get("_nanoseconds"))
                    .and_then(Value::as_u64)
                    .unwrap_or(0) as u32;
                Ok(Self::from_epoch_seconds(seconds, nanos))
            }
            other => Err(D::Error::custom(format!(
                "cannot read timestamp from {other}"
            ))),
        }
    }
}

/// Coerce a stored notes field to a list: absent → empty, bare scalar →
/// single-element list, list → shallow copy. No deeper flattening and no
/// dedup of identical note text.
pub fn to_note_list(notes: Option<&Value>) -> Vec<Value> {
    match notes {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    }
}
