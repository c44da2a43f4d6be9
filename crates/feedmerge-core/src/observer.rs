//! Merge diagnostics.
//!
//! The engine reports what it sees through a [`MergeObserver`] handed to it
//! at construction. Nothing reported here influences the merge itself:
//! conflicts are fire-and-continue, statistics are informational.
//!
//! - [`TracingObserver`] -- writes everything to `tracing` (the default)
//! - [`RecordingObserver`] -- keeps everything in memory for inspection
//! - [`NoOpObserver`] -- discards everything

use serde::Serialize;
use tracing::{debug, info, warn};

use feedmerge_types::{EventId, EventRecord};

/// Two records that share an id but differ in content.
///
/// The `stored` record was seen first and stays authoritative; `incoming`
/// is dropped after being reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityConflict {
    /// Source in which the second copy was found.
    pub source: String,
    /// The shared id.
    #[serde(serialize_with = "serialize_id")]
    pub id: EventId,
    /// The first-seen, authoritative record.
    pub stored: EventRecord,
    /// The later record that disagreed.
    pub incoming: EventRecord,
}

fn serialize_id<S: serde::Serializer>(id: &EventId, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(id)
}

/// Ingestion statistics for one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceCounts {
    /// Records whose id had not been seen before.
    pub added: usize,
    /// Records read from the source.
    pub seen: usize,
    /// Records whose id was known and whose content disagreed.
    pub conflicts: usize,
    /// Distinct ids known after this source.
    pub distinct_total: usize,
}

/// Statistics for one fully processed source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    /// Diagnostic name of the source.
    pub source: String,
    /// The counts themselves.
    #[serde(flatten)]
    pub counts: SourceCounts,
}

impl SourceStats {
    /// Records that repeated an already known id.
    pub const fn overlapping(&self) -> usize {
        self.counts.seen.saturating_sub(self.counts.added)
    }
}

/// Running totals for a whole merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    /// Statistics for every fully processed source, in order.
    pub sources: Vec<SourceStats>,
    /// Conflicts reported so far.
    pub conflicts: usize,
    /// Distinct ids emitted so far.
    pub distinct: usize,
}

impl MergeSummary {
    /// Records read across all fully processed sources.
    pub fn records_seen(&self) -> usize {
        self.sources
            .iter()
            .fold(0, |acc, s| acc.saturating_add(s.counts.seen))
    }
}

/// Receives merge diagnostics.
///
/// All hooks default to doing nothing.
pub trait MergeObserver {
    /// A source was read and normalized into `records` records.
    fn source_loaded(&mut self, _source: &str, _records: usize) {}

    /// A known id arrived with different content.
    fn conflict(&mut self, _conflict: &IdentityConflict) {}

    /// A source has been fully processed.
    fn source_merged(&mut self, _stats: &SourceStats) {}

    /// Every source has been processed.
    fn merge_finished(&mut self, _summary: &MergeSummary) {}
}

impl<O: MergeObserver + ?Sized> MergeObserver for &mut O {
    fn source_loaded(&mut self, source: &str, records: usize) {
        (**self).source_loaded(source, records);
    }

    fn conflict(&mut self, conflict: &IdentityConflict) {
        (**self).conflict(conflict);
    }

    fn source_merged(&mut self, stats: &SourceStats) {
        (**self).source_merged(stats);
    }

    fn merge_finished(&mut self, summary: &MergeSummary) {
        (**self).merge_finished(summary);
    }
}

impl<O: MergeObserver + ?Sized> MergeObserver for Box<O> {
    fn source_loaded(&mut self, source: &str, records: usize) {
        (**self).source_loaded(source, records);
    }

    fn conflict(&mut self, conflict: &IdentityConflict) {
        (**self).conflict(conflict);
    }

    fn source_merged(&mut self, stats: &SourceStats) {
        (**self).source_merged(stats);
    }

    fn merge_finished(&mut self, summary: &MergeSummary) {
        (**self).merge_finished(summary);
    }
}

/// An observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl MergeObserver for NoOpObserver {}

/// Reports diagnostics as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl MergeObserver for TracingObserver {
    fn source_loaded(&mut self, source: &str, records: usize) {
        debug!(source, records, "Snapshot loaded");
    }

    fn conflict(&mut self, conflict: &IdentityConflict) {
        warn!(
            source = conflict.source,
            id = %conflict.id,
            stored = %conflict.stored.to_json(),
            incoming = %conflict.incoming.to_json(),
            "Mismatch between records sharing an id"
        );
    }

    fn source_merged(&mut self, stats: &SourceStats) {
        info!(
            source = stats.source,
            added = stats.counts.added,
            seen = stats.counts.seen,
            conflicts = stats.counts.conflicts,
            distinct_total = stats.counts.distinct_total,
            "Added {} out of {} events",
            stats.counts.added,
            stats.counts.seen
        );
    }

    fn merge_finished(&mut self, summary: &MergeSummary) {
        info!(
            sources = summary.sources.len(),
            records_seen = summary.records_seen(),
            distinct = summary.distinct,
            conflicts = summary.conflicts,
            "Merge complete"
        );
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingObserver {
    /// Every reported conflict, in order.
    pub conflicts: Vec<IdentityConflict>,
    /// Statistics for every processed source, in order.
    pub sources: Vec<SourceStats>,
    /// Names of loaded sources, in load order.
    pub loaded: Vec<String>,
    /// Final summary, once the merge ran to completion.
    pub finished: Option<MergeSummary>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MergeObserver for RecordingObserver {
    fn source_loaded(&mut self, source: &str, _records: usize) {
        self.loaded.push(source.to_owned());
    }

    fn conflict(&mut self, conflict: &IdentityConflict) {
        self.conflicts.push(conflict.clone());
    }

    fn source_merged(&mut self, stats: &SourceStats) {
        self.sources.push(stats.clone());
    }

    fn merge_finished(&mut self, summary: &MergeSummary) {
        self.finished = Some(summary.clone());
    }
}
