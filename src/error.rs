use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TasteError>;

/// Errors raised while loading relations, exporting results, or talking to
/// the SQL reference engine. The pipeline itself is infallible.
#[derive(Debug, Error)]
pub enum TasteError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// CSV parsing or writing error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// Embedded SQLite error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Input row could not be interpreted.
    #[error("{path}: row {row}: {message}")]
    InvalidRow {
        /// File the row came from.
        path: PathBuf,
        /// One-based data row number (headers excluded).
        row: u64,
        /// What was wrong with the row.
        message: String,
    },
    /// Invalid argument or configuration value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TasteError {
    fn from(err: serde_json::Error) -> Self {
        TasteError::Serialization(err.to_string())
    }
}
