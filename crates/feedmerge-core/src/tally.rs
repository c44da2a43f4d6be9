//! Event-type counts over a merged stream.

use std::collections::BTreeMap;

use serde::Serialize;

use feedmerge_types::EventRecord;

/// Label used for records without a string `type` field.
pub const UNTYPED: &str = "<untyped>";

/// Counts records by their `type` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TypeTally {
    counts: BTreeMap<String, usize>,
}

impl TypeTally {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one record.
    pub fn record(&mut self, record: &EventRecord) {
        let key = record.event_type().unwrap_or(UNTYPED);
        let count = self.counts.entry(key.to_owned()).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Count for a single type.
    pub fn get(&self, event_type: &str) -> usize {
        self.counts.get(event_type).copied().unwrap_or(0)
    }

    /// Total number of counted records.
    pub fn total(&self) -> usize {
        self.counts.values().fold(0, |acc, n| acc.saturating_add(*n))
    }

    /// Types with their counts, most frequent first, ties by name.
    pub fn most_common(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<_> = self
            .counts
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

impl<'a> Extend<&'a EventRecord> for TypeTally {
    fn extend<T: IntoIterator<Item = &'a EventRecord>>(&mut self, iter: T) {
        for record in iter {
            self.record(record);
        }
    }
}

impl<'a> FromIterator<&'a EventRecord> for TypeTally {
    fn from_iter<T: IntoIterator<Item = &'a EventRecord>>(iter: T) -> Self {
        let mut tally = Self::new();
        tally.extend(iter);
        tally
    }
}
