//! Error types for Grafeo Core.

use thiserror::Error;

use crate::record::Signer;
use crate::types::Version;

/// Errors from the signature engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature")]
    InvalidSignature,
}

/// A value failed its structural shape check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("malformed public key in field `{field}`")]
    PublicKey { field: &'static str },

    #[error("malformed private key for {signer}")]
    PrivateKey { signer: Signer },

    #[error("malformed signature in field `{field}`")]
    Signature { field: &'static str },

    #[error("malformed name")]
    Name,
}

/// Why a record is not valid.
///
/// `is_valid()` folds all of these into `false`. The variants exist for
/// callers that ask for diagnostics through `check()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    #[error("signature by {signer} does not verify")]
    CryptoMismatch { signer: Signer },

    #[error("{keys} input keys but {signatures} input signatures")]
    CountMismatch { keys: usize, signatures: usize },

    #[error("unsupported version: expected {expected}, found {found}")]
    VersionMismatch { expected: Version, found: Version },
}

/// Errors returned by `sign()` and the construction helpers.
///
/// Whenever one of these is returned, the record holds no signatures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignError {
    #[error("cannot sign: {0}")]
    Precondition(#[from] ValidationError),

    #[error("signing failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("signed record failed its self-check: {0}")]
    SelfCheck(ValidationError),
}

impl From<FormatError> for SignError {
    fn from(e: FormatError) -> Self {
        SignError::Precondition(ValidationError::Format(e))
    }
}
