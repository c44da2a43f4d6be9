//! Equality predicates for duplicate records.
//!
//! When an id shows up again the engine asks a [`RecordEquality`] whether the
//! new copy matches the stored one. A mismatch is reported as a conflict.
//!
//! | Predicate | `{"n": 1}` vs `{"n": 1.0}` | key order |
//! |-----------|---------------------------|-----------|
//! | [`Structural`] | conflict | ignored |
//! | [`NumericTolerant`] | equal | ignored |
//!
//! [`IgnoringFields`] wraps either one and drops volatile top-level fields
//! before comparing.

use std::collections::BTreeSet;

use serde_json::{Map, Number, Value};

use feedmerge_types::EventRecord;

use crate::config::{EqualityConfig, EqualityMode};

/// Decides whether two records with the same id carry the same content.
///
/// Predicates see the full field maps of both records, id included.
pub trait RecordEquality {
    /// Return `true` if `incoming` matches the already stored record.
    fn equivalent(&self, stored: &Map<String, Value>, incoming: &Map<String, Value>) -> bool;

    /// Compare two records.
    fn records_match(&self, stored: &EventRecord, incoming: &EventRecord) -> bool {
        self.equivalent(stored.fields(), incoming.fields())
    }
}

impl<E: RecordEquality + ?Sized> RecordEquality for Box<E> {
    fn equivalent(&self, stored: &Map<String, Value>, incoming: &Map<String, Value>) -> bool {
        (**self).equivalent(stored, incoming)
    }
}

/// Exact JSON value equality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Structural;

impl RecordEquality for Structural {
    fn equivalent(&self, stored: &Map<String, Value>, incoming: &Map<String, Value>) -> bool {
        stored == incoming
    }
}

/// JSON equality where numbers compare by value, not representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumericTolerant;

impl RecordEquality for NumericTolerant {
    fn equivalent(&self, stored: &Map<String, Value>, incoming: &Map<String, Value>) -> bool {
        objects_match(stored, incoming)
    }
}

fn objects_match(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(key, va)| b.get(key).is_some_and(|vb| values_match(va, vb)))
}

fn values_match(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_match(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_match(x, y))
        }
        (Value::Object(x), Value::Object(y)) => objects_match(x, y),
        _ => a == b,
    }
}

fn numbers_match(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        // Adding zero folds -0.0 into 0.0 before the total-order comparison.
        (Some(a), Some(b)) => (a + 0.0).total_cmp(&(b + 0.0)).is_eq(),
        _ => false,
    }
}

/// Wraps another predicate and leaves some top-level fields out of the
/// comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoringFields<E> {
    inner: E,
    ignored: BTreeSet<String>,
}

impl<E: RecordEquality> IgnoringFields<E> {
    /// Wrap `inner`, ignoring the named fields.
    pub fn new<I, S>(inner: E, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner,
            ignored: fields.into_iter().map(Into::into).collect(),
        }
    }

    fn strip(&self, fields: &Map<String, Value>) -> Map<String, Value> {
        fields
            .iter()
            .filter(|(key, _)| !self.ignored.contains(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl<E: RecordEquality> RecordEquality for IgnoringFields<E> {
    fn equivalent(&self, stored: &Map<String, Value>, incoming: &Map<String, Value>) -> bool {
        self.inner
            .equivalent(&self.strip(stored), &self.strip(incoming))
    }
}

/// Build the predicate described by configuration.
pub fn equality_from_config(config: &EqualityConfig) -> Box<dyn RecordEquality> {
    match (config.mode, config.ignore_fields.is_empty()) {
        (EqualityMode::Structural, true) => Box::new(Structural),
        (EqualityMode::Numeric, true) => Box::new(NumericTolerant),
        (EqualityMode::Structural, false) => {
            Box::new(IgnoringFields::new(Structural, config.ignore_fields.clone()))
        }
        (EqualityMode::Numeric, false) => Box::new(IgnoringFields::new(
            NumericTolerant,
            config.ignore_fields.clone(),
        )),
    }
}
