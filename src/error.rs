//! Error types for relation sources.
//!
//! The cascade search itself cannot fail; everything that can go wrong
//! happens while reading the schema, before the graph is built.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for relation source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Failure to obtain foreign-key records for an analysis.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The schema file does not exist
    #[error("input file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// The target table is not part of the schema
    #[error("table '{0}' does not exist in the schema")]
    UnknownTable(String),

    /// The file cannot be read as the requested kind of source
    #[error("unsupported schema source: {}", .0.display())]
    UnsupportedSource(PathBuf),

    /// SQLite operation failed
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
