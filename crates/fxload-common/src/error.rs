//! Error types for fxload
//!
//! Every variant is fatal to the run. The loader deliberately has no retry,
//! skip, or downgrade path: inserts are idempotent, so the recovery story for
//! any failure is "fix the input or the store and rerun the whole job".

use thiserror::Error;

/// Result type alias for fxload operations
pub type Result<T> = std::result::Result<T, ImportError>;

/// Main error type for fxload
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed archive filename '{0}': expected PAIR-YYYY-MM.zip")]
    MalformedFilename(String),

    #[error("unparseable timestamp '{0}': expected 'YYYYMMDD HH:MM:SS' with optional fraction")]
    UnparseableTimestamp(String),

    #[error("malformed row: {0}")]
    MalformedRow(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("store connection error: {0}")]
    StoreConnection(String),

    #[error("store write error: {0}")]
    StoreWrite(String),
}

impl ImportError {
    /// Create an archive error with the offending path for context
    pub fn archive(path: impl std::fmt::Display, source: impl std::fmt::Display) -> Self {
        Self::Archive(format!("{}: {}", path, source))
    }

    /// Create a store connection error
    pub fn connection(source: impl std::fmt::Display) -> Self {
        Self::StoreConnection(source.to_string())
    }

    /// Create a store write error with the target table for context
    pub fn write(table: &str, source: impl std::fmt::Display) -> Self {
        Self::StoreWrite(format!("table '{}': {}", table, source))
    }
}
