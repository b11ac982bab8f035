//! Behaviour shared by producer and product records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ProtocolConfig;
use crate::crypto::verify;
use crate::error::{FormatError, ValidationError};
use crate::producer::Producer;
use crate::product::Product;
use crate::types::Version;
use crate::validation::{check_name, check_public_key, check_signature};

/// The two kinds of record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Producer,
    Product,
}

impl RecordKind {
    /// Lowercase name, also used as the collection name by stores.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Producer => "producer",
            Self::Product => "product",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The key holder behind one signature of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signer {
    /// The record's own key (a producer's self-signature or a product's own).
    Own,
    /// The producer co-signing a product.
    Producer,
    /// The holder of the input at this position of a product.
    Input(usize),
}

impl fmt::Display for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Own => f.write_str("own key"),
            Self::Producer => f.write_str("producer"),
            Self::Input(i) => write!(f, "input #{i}"),
        }
    }
}

/// A versioned, signable record.
///
/// Validity is a pure query: it re-derives the payload and re-checks every
/// format rule and signature each time, and never mutates the record.
pub trait Record {
    /// Which kind of record this is.
    fn kind(&self) -> RecordKind;

    /// The public key identifying the record.
    fn public_key(&self) -> &str;

    /// The protocol version the record claims.
    fn version(&self) -> Version;

    /// The human readable name.
    fn name(&self) -> &str;

    /// The canonical payload covered by the record's signatures.
    fn payload(&self) -> String;

    /// Check every format rule and every signature, ignoring the version.
    fn verify_signatures(&self) -> Result<(), ValidationError>;

    /// Full diagnostic check against `config`.
    fn check(&self, config: &ProtocolConfig) -> Result<(), ValidationError> {
        let found = self.version();
        if found != config.current_version {
            return Err(ValidationError::VersionMismatch {
                expected: config.current_version,
                found,
            });
        }
        self.verify_signatures()
    }

    /// True if `check(config)` passes.
    fn is_valid_for(&self, config: &ProtocolConfig) -> bool {
        self.check(config).is_ok()
    }

    /// True if the record is valid under the default protocol config.
    ///
    /// All failure causes fold into `false`; use [`Record::check`] to learn
    /// which rule failed.
    fn is_valid(&self) -> bool {
        self.is_valid_for(&ProtocolConfig::default())
    }
}

/// Either kind of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnyRecord {
    Producer(Producer),
    Product(Product),
}

impl AnyRecord {
    fn inner(&self) -> &dyn Record {
        match self {
            Self::Producer(p) => p,
            Self::Product(p) => p,
        }
    }

    /// The producer, if this is one.
    pub fn as_producer(&self) -> Option<&Producer> {
        match self {
            Self::Producer(p) => Some(p),
            Self::Product(_) => None,
        }
    }

    /// The product, if this is one.
    pub fn as_product(&self) -> Option<&Product> {
        match self {
            Self::Product(p) => Some(p),
            Self::Producer(_) => None,
        }
    }
}

impl Record for AnyRecord {
    fn kind(&self) -> RecordKind {
        self.inner().kind()
    }

    fn public_key(&self) -> &str {
        self.inner().public_key()
    }

    fn version(&self) -> Version {
        self.inner().version()
    }

    fn name(&self) -> &str {
        self.inner().name()
    }

    fn payload(&self) -> String {
        self.inner().payload()
    }

    fn verify_signatures(&self) -> Result<(), ValidationError> {
        self.inner().verify_signatures()
    }
}

impl From<Producer> for AnyRecord {
    fn from(p: Producer) -> Self {
        Self::Producer(p)
    }
}

impl From<Product> for AnyRecord {
    fn from(p: Product) -> Self {
        Self::Product(p)
    }
}

pub(crate) fn require_public_key(field: &'static str, key: &str) -> Result<(), FormatError> {
    if check_public_key(key) {
        Ok(())
    } else {
        Err(FormatError::PublicKey { field })
    }
}

pub(crate) fn require_signature(field: &'static str, signature: &str) -> Result<(), FormatError> {
    if check_signature(signature) {
        Ok(())
    } else {
        Err(FormatError::Signature { field })
    }
}

pub(crate) fn require_name(name: &str) -> Result<(), FormatError> {
    if check_name(name) {
        Ok(())
    } else {
        Err(FormatError::Name)
    }
}

pub(crate) fn require_verified(
    signer: Signer,
    public_key: &str,
    message: &[u8],
    signature: &str,
) -> Result<(), ValidationError> {
    if verify(public_key, message, signature) {
        Ok(())
    } else {
        Err(ValidationError::CryptoMismatch { signer })
    }
}
