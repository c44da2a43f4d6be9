//! Event records.
//!
//! An [`EventRecord`] is the JSON object of one feed entry together with its
//! parsed [`EventId`]. Everything except the id field is opaque payload: the
//! merger compares it, never interprets it, and writes it back out exactly as
//! it was read.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::id::{json_kind, EventId};

/// Name of the identity field used when none is configured.
pub const DEFAULT_ID_FIELD: &str = "id";

/// Errors raised when a JSON value cannot be used as an event record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The value is not a JSON object.
    #[error("expected a record object, got {found}")]
    NotAnObject {
        /// The JSON type that was found instead.
        found: &'static str,
    },

    /// The object has no identity field.
    #[error("record has no `{field}` field")]
    MissingId {
        /// Name of the identity field.
        field: String,
    },

    /// The identity field holds a value that cannot be ordered.
    #[error("invalid `{field}` field: {reason}")]
    InvalidId {
        /// Name of the identity field.
        field: String,
        /// What is wrong with the value.
        reason: String,
    },
}

/// One event from the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    id: EventId,
    fields: Map<String, Value>,
}

impl EventRecord {
    /// Build a record from a JSON value, reading identity from `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the value is not an object or lacks a
    /// usable `id` field.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        Self::from_value_keyed(value, DEFAULT_ID_FIELD)
    }

    /// Build a record from a JSON value, reading identity from `id_field`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the value is not an object or lacks a
    /// usable identity field.
    pub fn from_value_keyed(value: Value, id_field: &str) -> Result<Self, RecordError> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(RecordError::NotAnObject {
                    found: json_kind(&other),
                })
            }
        };
        let raw_id = fields.get(id_field).ok_or_else(|| RecordError::MissingId {
            field: id_field.to_owned(),
        })?;
        let id = EventId::from_json(id_field, raw_id)?;
        Ok(Self { id, fields })
    }

    /// The record's identity.
    pub const fn id(&self) -> &EventId {
        &self.id
    }

    /// All fields of the record, including the id field.
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Look up a single field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The `type` field, when the feed provides one as a string.
    pub fn event_type(&self) -> Option<&str> {
        self.fields.get("type").and_then(Value::as_str)
    }

    /// A copy of the record as a JSON value.
    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Consume the record, returning its JSON value.
    pub fn into_json(self) -> Value {
        Value::Object(self.fields)
    }
}

impl Serialize for EventRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}
