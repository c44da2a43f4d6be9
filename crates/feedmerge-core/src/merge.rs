//! The deduplicating merge engine.
//!
//! Feeds only expose a trailing window, so a full history is stitched
//! together from many overlapping snapshots. [`MergeEngine::merge`] walks the
//! sources in the order given and folds them into an identity table:
//!
//! ```text
//! for each source (loaded only when reached):
//!     sort records by id, ascending
//!     for each record:
//!         id unseen   -> remember it, emit it
//!         id seen     -> compare with the remembered record
//!                        differs -> report a conflict, keep the first
//!     report per-source statistics
//! ```
//!
//! # Guarantees
//!
//! - Every id is emitted at most once.
//! - Within a source, emission follows ascending id order; across sources,
//!   it follows source order.
//! - The first-seen record for an id is authoritative and never replaced.
//! - Conflicts are reported, never raised. Only load failures end a merge.
//!
//! The identity table lives inside the returned [`Merged`] iterator. Dropping
//! the iterator early is how a consumer cancels; later sources are never read.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::iter::FusedIterator;
use std::vec;

use feedmerge_types::{EventId, EventRecord};

use crate::config::MergeConfig;
use crate::equality::{equality_from_config, RecordEquality};
use crate::error::MergeError;
use crate::loader::SnapshotLoader;
use crate::observer::{
    IdentityConflict, MergeObserver, MergeSummary, SourceCounts, SourceStats, TracingObserver,
};
use crate::source::SnapshotSource;

/// Merges ordered snapshot sources into one deduplicated event stream.
pub struct MergeEngine<O = TracingObserver> {
    loader: SnapshotLoader,
    equality: Box<dyn RecordEquality>,
    observer: O,
}

impl MergeEngine<TracingObserver> {
    /// Create an engine from configuration, reporting through `tracing`.
    pub fn new(config: &MergeConfig) -> Self {
        Self {
            loader: SnapshotLoader::new(&config.merge),
            equality: equality_from_config(&config.equality),
            observer: TracingObserver,
        }
    }
}

impl Default for MergeEngine<TracingObserver> {
    fn default() -> Self {
        Self::new(&MergeConfig::default())
    }
}

impl<O: MergeObserver> MergeEngine<O> {
    /// Replace the observer.
    pub fn with_observer<P: MergeObserver>(self, observer: P) -> MergeEngine<P> {
        MergeEngine {
            loader: self.loader,
            equality: self.equality,
            observer,
        }
    }

    /// Replace the equality predicate used for conflict detection.
    #[must_use]
    pub fn with_equality<E: RecordEquality + 'static>(mut self, equality: E) -> Self {
        self.equality = Box::new(equality);
        self
    }

    /// The observer.
    pub const fn observer(&self) -> &O {
        &self.observer
    }

    /// Consume the engine, returning its observer.
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Start a lazy merge over `sources`.
    ///
    /// No source is read until the returned iterator is polled, and each
    /// source is read only once the previous one is exhausted. The iterator
    /// yields `Ok` for every newly seen record and at most one `Err`, after
    /// which it is finished.
    pub fn merge<I>(&mut self, sources: I) -> Merged<'_, O, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: SnapshotSource,
    {
        Merged {
            engine: self,
            sources: sources.into_iter(),
            current: None,
            table: HashMap::new(),
            summary: MergeSummary::default(),
            finished: false,
        }
    }

    /// Run a merge to completion.
    ///
    /// # Errors
    ///
    /// Returns the first [`MergeError`] raised by any source. Records
    /// emitted before the failure are discarded by this convenience; use
    /// [`merge`](Self::merge) to keep them.
    pub fn merge_all<I>(&mut self, sources: I) -> Result<(Vec<EventRecord>, MergeSummary), MergeError>
    where
        I: IntoIterator,
        I::Item: SnapshotSource,
    {
        let mut merged = self.merge(sources);
        let records = merged.by_ref().collect::<Result<Vec<_>, _>>()?;
        Ok((records, merged.into_summary()))
    }
}

/// The source currently being drained.
struct OpenSource {
    name: String,
    records: vec::IntoIter<EventRecord>,
    counts: SourceCounts,
}

/// Lazy output of [`MergeEngine::merge`].
pub struct Merged<'a, O, I> {
    engine: &'a mut MergeEngine<O>,
    sources: I,
    current: Option<OpenSource>,
    table: HashMap<EventId, EventRecord>,
    summary: MergeSummary,
    finished: bool,
}

impl<O, I> Merged<'_, O, I>
where
    O: MergeObserver,
    I: Iterator,
    I::Item: SnapshotSource,
{
    /// Statistics gathered so far.
    ///
    /// The source being drained is not included until it is exhausted.
    pub const fn summary(&self) -> &MergeSummary {
        &self.summary
    }

    /// Consume the iterator, returning its statistics.
    pub fn into_summary(self) -> MergeSummary {
        self.summary
    }

    /// The source being drained, or the next one loaded. `None` once every
    /// source has been consumed.
    fn resume_or_open(&mut self) -> Option<Result<OpenSource, MergeError>> {
        if let Some(open) = self.current.take() {
            return Some(Ok(open));
        }
        let source = self.sources.next()?;
        Some(self.open(&source))
    }

    /// Load and sort the next source.
    fn open(&mut self, source: &I::Item) -> Result<OpenSource, MergeError> {
        let name = source.name();
        let mut records = self.engine.loader.load(source)?;
        self.engine.observer.source_loaded(&name, records.len());

        // Stable, so duplicates within one source keep their stored order.
        records.sort_by(|a, b| a.id().cmp(b.id()));

        Ok(OpenSource {
            name,
            counts: SourceCounts {
                seen: records.len(),
                ..SourceCounts::default()
            },
            records: records.into_iter(),
        })
    }

    /// Drain `open` until a never-seen record turns up.
    fn advance(&mut self, open: &mut OpenSource) -> Option<EventRecord> {
        for record in open.records.by_ref() {
            match self.table.entry(record.id().clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(record.clone());
                    open.counts.added = open.counts.added.saturating_add(1);
                    self.summary.distinct = self.summary.distinct.saturating_add(1);
                    return Some(record);
                }
                Entry::Occupied(slot) => {
                    let stored = slot.get();
                    if !self.engine.equality.records_match(stored, &record) {
                        open.counts.conflicts = open.counts.conflicts.saturating_add(1);
                        self.summary.conflicts = self.summary.conflicts.saturating_add(1);
                        self.engine.observer.conflict(&IdentityConflict {
                            source: open.name.clone(),
                            id: record.id().clone(),
                            stored: stored.clone(),
                            incoming: record,
                        });
                    }
                }
            }
        }
        None
    }

    /// Record statistics for an exhausted source.
    fn close(&mut self, open: OpenSource) {
        let stats = SourceStats {
            source: open.name,
            counts: SourceCounts {
                distinct_total: self.table.len(),
                ..open.counts
            },
        };
        self.engine.observer.source_merged(&stats);
        self.summary.sources.push(stats);
    }
}

impl<O, I> Iterator for Merged<'_, O, I>
where
    O: MergeObserver,
    I: Iterator,
    I::Item: SnapshotSource,
{
    type Item = Result<EventRecord, MergeError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let mut open = match self.resume_or_open() {
                Some(Ok(open)) => open,
                Some(Err(err)) => {
                    self.finished = true;
                    return Some(Err(err));
                }
                None => {
                    self.finished = true;
                    self.engine.observer.merge_finished(&self.summary);
                    return None;
                }
            };

            if let Some(record) = self.advance(&mut open) {
                self.current = Some(open);
                return Some(Ok(record));
            }
            self.close(open);
        }
        None
    }
}

impl<O, I> FusedIterator for Merged<'_, O, I>
where
    O: MergeObserver,
    I: Iterator,
    I::Item: SnapshotSource,
{
}
