//! Shared type definitions for the feedmerge snapshot merger.
//!
//! An event feed is only ever observed through bounded snapshots, so the
//! merger treats every record as an opaque JSON object with exactly one
//! interpreted field: its identity. This crate defines that identity
//! ([`EventId`]) and the record wrapper ([`EventRecord`]) used by the merge
//! engine and the CLI.
//!
//! # Modules
//!
//! - [`id`] -- Totally ordered event identities
//! - [`record`] -- Validated event records and record-level errors

pub mod id;
pub mod record;

// Re-export primary types for convenience.
pub use id::{json_kind, EventId};
pub use record::{EventRecord, RecordError, DEFAULT_ID_FIELD};
