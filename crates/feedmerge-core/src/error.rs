//! Error types for snapshot loading and merging.
//!
//! Only structural problems are errors. A source that cannot be read or is
//! not JSON is a [`MergeError::Parse`]; a source whose content is not a
//! sequence of records is a [`MergeError::Shape`]. Identity conflicts are
//! never errors -- they go to the
//! [`MergeObserver`](crate::observer::MergeObserver).

use feedmerge_types::RecordError;

/// Why a source could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ParseCause {
    /// The source could not be read.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The content is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a parsed source is not a sequence of records.
#[derive(Debug, thiserror::Error)]
pub enum ShapeCause {
    /// After envelope unwrapping the value is not an array.
    #[error("expected an array of records, got {found}")]
    NotASequence {
        /// The JSON type that was found instead.
        found: &'static str,
    },

    /// An element of the array is not a usable record.
    #[error("record #{index}: {source}")]
    BadRecord {
        /// Position of the element in the stored array.
        index: usize,
        /// What is wrong with it.
        source: RecordError,
    },
}

/// Errors that abort a merge.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// A source could not be read or is not valid JSON.
    #[error("failed to parse snapshot {source_name}: {cause}")]
    Parse {
        /// Diagnostic name of the source.
        source_name: String,
        /// The underlying failure.
        #[source]
        cause: ParseCause,
    },

    /// A source parsed but does not hold a sequence of records.
    #[error("malformed snapshot {source_name}: {cause}")]
    Shape {
        /// Diagnostic name of the source.
        source_name: String,
        /// The underlying failure.
        #[source]
        cause: ShapeCause,
    },
}

impl MergeError {
    /// Diagnostic name of the source that failed.
    pub fn source_name(&self) -> &str {
        match self {
            Self::Parse { source_name, .. } | Self::Shape { source_name, .. } => source_name,
        }
    }

    pub(crate) fn parse(source_name: &str, cause: impl Into<ParseCause>) -> Self {
        Self::Parse {
            source_name: source_name.to_owned(),
            cause: cause.into(),
        }
    }

    pub(crate) fn shape(source_name: &str, cause: ShapeCause) -> Self {
        Self::Shape {
            source_name: source_name.to_owned(),
            cause,
        }
    }
}
