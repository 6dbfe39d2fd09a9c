//! Error types for engram-index operations.

use std::io;
use thiserror::Error;

/// Errors that can occur while building, querying or persisting an index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A vector, query or file header disagrees with the configured dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// I/O error from filesystem operations (including open failures).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source is readable but holds fewer values than its header declares.
    #[error("Corrupt index data: {0}")]
    CorruptData(String),

    /// Invalid configuration parameter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
