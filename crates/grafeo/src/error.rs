//! Error types for the Registry.

use grafeo_core::{RecordKind, SignError, ValidationError};
use grafeo_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A record could not be signed.
    #[error("signing failed: {0}")]
    Sign(#[from] SignError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The record is not valid and was not stored.
    #[error("invalid {kind}: {reason}")]
    Invalid {
        kind: RecordKind,
        reason: ValidationError,
    },

    /// A different record is already stored under this public key.
    #[error("conflicting {kind} already stored under {public_key}")]
    Conflict {
        kind: RecordKind,
        public_key: String,
    },
}

/// Result type for Registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
