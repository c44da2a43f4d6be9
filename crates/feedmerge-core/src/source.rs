//! Snapshot sources and source discovery.
//!
//! A [`SnapshotSource`] is anything that can hand back the raw text of one
//! stored snapshot. Fetching snapshots from the remote feed is someone
//! else's job; by the time the merger runs they are files on disk (or, in
//! tests and embedders, strings in memory via [`InlineSnapshot`]).
//!
//! Export tools name their files by collection timestamp, so a directory of
//! snapshots sorted by file name is already in collection order.
//! [`discover_sources`] and [`expand_inputs`] rely on that.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::MergeError;

/// A stored snapshot that can be read on demand.
///
/// Reading is deferred until the merge engine reaches the source, so a
/// consumer that stops early never touches later sources.
pub trait SnapshotSource {
    /// Name used in diagnostics and statistics.
    fn name(&self) -> String;

    /// Read the raw snapshot text.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the snapshot cannot be read.
    fn read(&self) -> io::Result<String>;
}

impl SnapshotSource for Path {
    fn name(&self) -> String {
        self.display().to_string()
    }

    fn read(&self) -> io::Result<String> {
        fs::read_to_string(self)
    }
}

impl SnapshotSource for PathBuf {
    fn name(&self) -> String {
        self.as_path().name()
    }

    fn read(&self) -> io::Result<String> {
        self.as_path().read()
    }
}

impl<S: SnapshotSource + ?Sized> SnapshotSource for &S {
    fn name(&self) -> String {
        (**self).name()
    }

    fn read(&self) -> io::Result<String> {
        (**self).read()
    }
}

impl<S: SnapshotSource + ?Sized> SnapshotSource for Box<S> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn read(&self) -> io::Result<String> {
        (**self).read()
    }
}

/// A snapshot held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSnapshot {
    name: String,
    contents: String,
}

impl InlineSnapshot {
    /// Create a named in-memory snapshot.
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

impl SnapshotSource for InlineSnapshot {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn read(&self) -> io::Result<String> {
        Ok(self.contents.clone())
    }
}

/// List the snapshot files directly inside `dir`, in file name order.
///
/// Only regular files whose extension equals `extension` are returned;
/// subdirectories are not descended into.
///
/// # Errors
///
/// Returns [`MergeError::Parse`] naming the directory if it cannot be
/// listed.
pub fn discover_sources(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, MergeError> {
    let dir_name = dir.display().to_string();
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| MergeError::parse(&dir_name, e))? {
        let path = entry.map_err(|e| MergeError::parse(&dir_name, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            found.push(path);
        }
    }
    found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(dir = %dir_name, sources = found.len(), "Discovered snapshot files");
    Ok(found)
}

/// Expand directory inputs in place, keeping file inputs as given.
///
/// # Errors
///
/// Returns [`MergeError::Parse`] if a directory input cannot be listed.
pub fn expand_inputs(inputs: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>, MergeError> {
    let mut expanded = Vec::with_capacity(inputs.len());
    for input in inputs {
        if input.is_dir() {
            expanded.extend(discover_sources(input, extension)?);
        } else {
            expanded.push(input.clone());
        }
    }
    Ok(expanded)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "[]").unwrap();
        path
    }

    #[test]
    fn inline_snapshot_reads_contents() {
        let snap = InlineSnapshot::new("mem", "[1]");
        assert_eq!(snap.name(), "mem");
        assert_eq!(snap.read().unwrap(), "[1]");
    }

    #[test]
    fn path_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "a.json");
        assert_eq!(path.read().unwrap(), "[]");
        assert!(path.name().ends_with("a.json"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(path.read().is_err());
    }

    #[test]
    fn discovery_sorts_by_name_and_filters_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "20240301.json");
        touch(dir.path(), "20240101.json");
        touch(dir.path(), "notes.txt");
        fs::create_dir(dir.path().join("nested.json")).unwrap();
        touch(dir.path(), "20240201.json");

        let found = discover_sources(dir.path(), "json").unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["20240101.json", "20240201.json", "20240301.json"]);
    }

    #[test]
    fn discovery_of_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_sources(&dir.path().join("nope"), "json").unwrap_err();
        assert!(matches!(err, MergeError::Parse { .. }));
    }

    #[test]
    fn expand_keeps_files_and_expands_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("snapshots");
        fs::create_dir(&sub).unwrap();
        let first = touch(dir.path(), "first.json");
        let b = touch(&sub, "b.json");
        let a = touch(&sub, "a.json");

        let expanded = expand_inputs(&[first.clone(), sub], "json").unwrap();
        assert_eq!(expanded, vec![first, a, b]);
    }
}
