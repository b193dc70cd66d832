//! Error types for ragindex-core.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Error returned by injected collaborators such as embedders and captioners.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the vector store, codec, builder, and query engine.
///
/// Per-file embedding failures during a rebuild are not represented here;
/// they are collected in [`crate::builder::BuildReport`] instead.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Vector length disagrees with the index's fixed dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension fixed by the first stored vector
        expected: usize,
        /// Length of the offending vector
        actual: usize,
    },

    /// Row accessor called beyond bounds.
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested row
        index: usize,
        /// Number of rows
        len: usize,
    },

    /// Persisted vector/metadata pair failed a structural or cross-check on load.
    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    /// Build directory cannot be created or read.
    #[error("Source directory {path:?} unavailable: {source}")]
    SourceUnavailable {
        /// Directory that was scanned
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// Empty, oversized, or non-finite vector.
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl IndexError {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        IndexError::CorruptIndex(msg.into())
    }
}
