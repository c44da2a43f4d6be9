//! Snapshot loading and envelope normalization.
//!
//! Snapshots have been stored in two layouts over time:
//!
//! ```text
//! [ {record}, {record}, ... ]                 bare sequence
//! { "events": [ {record}, ... ], ... }        envelope
//! ```
//!
//! [`SnapshotLoader::load`] checks explicitly for the envelope field and
//! unwraps it; anything else must already be the sequence. Records come
//! back in stored order.

use serde_json::Value;

use feedmerge_types::{json_kind, EventRecord};

use crate::config::MergeSettings;
use crate::error::{MergeError, ShapeCause};
use crate::source::SnapshotSource;

/// Reads snapshot sources into event records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotLoader {
    envelope_field: String,
    id_field: String,
}

impl SnapshotLoader {
    /// Create a loader from merge settings.
    pub fn new(settings: &MergeSettings) -> Self {
        Self {
            envelope_field: settings.envelope_field.clone(),
            id_field: settings.id_field.clone(),
        }
    }

    /// Read and normalize one snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Parse`] if the source cannot be read or is not
    /// JSON, and [`MergeError::Shape`] if the normalized value is not an
    /// array of records with usable ids.
    pub fn load<S: SnapshotSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<Vec<EventRecord>, MergeError> {
        let name = source.name();
        let text = source.read().map_err(|e| MergeError::parse(&name, e))?;
        let value: Value = serde_json::from_str(&text).map_err(|e| MergeError::parse(&name, e))?;
        self.records_from_value(&name, value)
    }

    /// Normalize an already parsed snapshot value.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Shape`] if the value is not a sequence of
    /// records with usable ids.
    pub fn records_from_value(
        &self,
        source_name: &str,
        value: Value,
    ) -> Result<Vec<EventRecord>, MergeError> {
        let items = match self.unwrap_envelope(value) {
            Value::Array(items) => items,
            other => {
                return Err(MergeError::shape(
                    source_name,
                    ShapeCause::NotASequence {
                        found: json_kind(&other),
                    },
                ))
            }
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                EventRecord::from_value_keyed(item, &self.id_field).map_err(|source| {
                    MergeError::shape(source_name, ShapeCause::BadRecord { index, source })
                })
            })
            .collect()
    }

    /// Tagged envelope check: only an object carrying the envelope field is
    /// unwrapped.
    fn unwrap_envelope(&self, value: Value) -> Value {
        match value {
            Value::Object(mut map) if map.contains_key(&self.envelope_field) => map
                .remove(&self.envelope_field)
                .unwrap_or(Value::Null),
            other => other,
        }
    }
}

impl Default for SnapshotLoader {
    fn default() -> Self {
        Self::new(&MergeSettings::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use feedmerge_types::{EventId, RecordError};

    use super::*;
    use crate::source::InlineSnapshot;

    fn load(contents: &str) -> Result<Vec<EventRecord>, MergeError> {
        SnapshotLoader::default().load(&InlineSnapshot::new("test", contents))
    }

    #[test]
    fn bare_sequence_keeps_stored_order() {
        let records = load(r#"[{"id": 3}, {"id": 1}, {"id": 2}]"#).unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id().clone()).collect();
        assert_eq!(ids, [EventId::from(3), EventId::from(1), EventId::from(2)]);
    }

    #[test]
    fn envelope_is_unwrapped() {
        let records = load(r#"{"events": [{"id": 1}], "profile": {"login": "x"}}"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), &EventId::from(1));
    }

    #[test]
    fn custom_envelope_field() {
        let loader = SnapshotLoader::new(&MergeSettings {
            envelope_field: "items".to_owned(),
            ..MergeSettings::default()
        });
        let records = loader
            .load(&InlineSnapshot::new("x", r#"{"items": [{"id": "a"}]}"#))
            .unwrap();
        assert_eq!(records[0].id(), &EventId::from("a"));
    }

    #[test]
    fn empty_sequence_is_fine() {
        assert!(load("[]").unwrap().is_empty());
        assert!(load(r#"{"events": []}"#).unwrap().is_empty());
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = load("[{").unwrap_err();
        assert!(matches!(err, MergeError::Parse { cause: crate::error::ParseCause::Json(_), .. }));
        assert_eq!(err.source_name(), "test");
    }

    #[test]
    fn object_without_envelope_is_shape_error() {
        let err = load(r#"{"data": []}"#).unwrap_err();
        assert!(matches!(
            err,
            MergeError::Shape { cause: ShapeCause::NotASequence { found: "object" }, .. }
        ));
    }

    #[test]
    fn envelope_holding_non_array_is_shape_error() {
        let err = load(r#"{"events": 5}"#).unwrap_err();
        assert!(matches!(
            err,
            MergeError::Shape { cause: ShapeCause::NotASequence { found: "number" }, .. }
        ));
    }

    #[test]
    fn non_object_element_is_shape_error() {
        let err = load(r#"[{"id": 1}, "oops"]"#).unwrap_err();
        assert!(matches!(
            err,
            MergeError::Shape {
                cause: ShapeCause::BadRecord { index: 1, source: RecordError::NotAnObject { .. } },
                ..
            }
        ));
    }

    #[test]
    fn record_without_id_is_shape_error() {
        let err = load(r#"[{"type": "PushEvent"}]"#).unwrap_err();
        assert!(matches!(
            err,
            MergeError::Shape {
                cause: ShapeCause::BadRecord { index: 0, source: RecordError::MissingId { .. } },
                ..
            }
        ));
    }
}
