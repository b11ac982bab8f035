//! Error types for the store module.

use grafeo_core::{RecordKind, ValidationError};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The remote backend could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// A record was refused before being sent to the remote backend.
    #[error("refusing to send invalid {kind}: {reason}")]
    InvalidRecord {
        kind: RecordKind,
        reason: ValidationError,
    },

    /// The remote backend refused a record.
    #[error("rejected by remote store with status {status}")]
    Rejected { status: u16 },

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
