//! Snapshot merging for bounded event feeds.
//!
//! Remote feeds often expose only their most recent N events. Fetching
//! them periodically produces a series of overlapping snapshots, none of
//! which is complete. This crate loads those snapshots and folds them into a
//! single deduplicated stream, reporting records that reuse an id with
//! different content.
//!
//! # Architecture
//!
//! ```text
//! sources --> SnapshotLoader --> sort by id --> identity table --> emitted records
//!                                                   |
//!                                                   +--> MergeObserver (conflicts, stats)
//! ```
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with environment overrides
//! - [`error`] -- Structural error taxonomy
//! - [`source`] -- Snapshot sources and directory discovery
//! - [`loader`] -- Envelope normalization and record validation
//! - [`equality`] -- Pluggable conflict predicates
//! - [`observer`] -- Conflict and statistics reporting
//! - [`merge`] -- The merge engine and its lazy output
//! - [`tally`] -- Event-type counts
//!
//! # Usage
//!
//! ```
//! use feedmerge_core::{InlineSnapshot, MergeEngine, RecordingObserver};
//!
//! let older = InlineSnapshot::new("older", r#"[{"id": 2}, {"id": 1}]"#);
//! let newer = InlineSnapshot::new("newer", r#"{"events": [{"id": 3}, {"id": 2}]}"#);
//!
//! let mut engine = MergeEngine::default().with_observer(RecordingObserver::new());
//! let ids: Vec<String> = engine
//!     .merge([older, newer])
//!     .map(|r| r.map(|rec| rec.id().to_string()))
//!     .collect::<Result<_, _>>()
//!     .unwrap_or_default();
//!
//! assert_eq!(ids, ["1", "2", "3"]);
//! assert!(engine.observer().conflicts.is_empty());
//! ```

pub mod config;
pub mod equality;
pub mod error;
pub mod loader;
pub mod merge;
pub mod observer;
pub mod source;
pub mod tally;

// Re-export primary types at crate root.
pub use config::{ConfigError, MergeConfig};
pub use equality::{IgnoringFields, NumericTolerant, RecordEquality, Structural};
pub use error::MergeError;
pub use feedmerge_types::{EventId, EventRecord};
pub use loader::SnapshotLoader;
pub use merge::{MergeEngine, Merged};
pub use observer::{
    IdentityConflict, MergeObserver, MergeSummary, NoOpObserver, RecordingObserver, SourceStats,
    TracingObserver,
};
pub use source::{discover_sources, expand_inputs, InlineSnapshot, SnapshotSource};
pub use tally::TypeTally;
