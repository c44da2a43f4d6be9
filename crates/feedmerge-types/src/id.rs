//! Event identities.
//!
//! Feeds in the wild carry ids either as JSON integers or as strings of
//! digits (large ids are often stringified to survive 53-bit JSON readers).
//! [`EventId`] accepts both and defines a total order that matches recency
//! for either form:
//!
//! - integer ids sort before string ids and compare numerically;
//! - strings made only of ASCII digits sort before any other string and
//!   compare numerically, regardless of length or leading zeros;
//! - remaining strings compare by bytes.
//!
//! Identity is exact. The integer `7` and the string `"7"` are different ids.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use crate::record::RecordError;

/// Identity of one event in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventId {
    /// A JSON integer id. Wide enough for both `i64` and `u64` feeds.
    Int(i128),
    /// A JSON string id.
    Text(String),
}

impl EventId {
    /// Build an id from the JSON value found in a record's id field.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidId`] if the value is not an integer or
    /// a string.
    pub fn from_json(field: &str, value: &Value) -> Result<Self, RecordError> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(i128::from)
                .or_else(|| n.as_u64().map(i128::from))
                .map(Self::Int)
                .ok_or_else(|| RecordError::InvalidId {
                    field: field.to_owned(),
                    reason: format!("non-integer number {n}"),
                }),
            Value::String(s) => Ok(Self::Text(s.clone())),
            other => Err(RecordError::InvalidId {
                field: field.to_owned(),
                reason: format!("expected integer or string, got {}", json_kind(other)),
            }),
        }
    }
}

impl Ord for EventId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Int(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Int(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => compare_text(a, b),
        }
    }
}

impl PartialOrd for EventId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i32> for EventId {
    fn from(n: i32) -> Self {
        Self::Int(i128::from(n))
    }
}

impl From<i64> for EventId {
    fn from(n: i64) -> Self {
        Self::Int(i128::from(n))
    }
}

impl From<u64> for EventId {
    fn from(n: u64) -> Self {
        Self::Int(i128::from(n))
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

/// Compare two string ids.
///
/// Equal numeric values fall back to byte order so that `Ord` agrees with
/// `Eq` (`"007"` and `"7"` are distinct ids).
fn compare_text(a: &str, b: &str) -> Ordering {
    match (significant_digits(a), significant_digits(b)) {
        (Some(da), Some(db)) => da
            .len()
            .cmp(&db.len())
            .then_with(|| da.cmp(db))
            .then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// The digits of `s` without leading zeros, or `None` if `s` is not a
/// non-empty run of ASCII digits.
fn significant_digits(s: &str) -> Option<&str> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let trimmed = s.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0" } else { trimmed })
}

/// Short name of a JSON value's type, for error messages.
pub const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
