//! Index serving error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or querying index state.
#[derive(Debug, Error)]
pub enum IndexError {
    /// usearch index failure
    #[error("Index error: {0}")]
    Index(String),

    /// Index or metadata file missing on disk
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Metadata document is valid JSON but not a recognized shape
    #[error("Metadata schema error: {0}")]
    Schema(String),

    /// Query vector dimension differs from the index dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata JSON parse error
    #[error("Metadata parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
