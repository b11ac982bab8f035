//! Producer: a self-signed identity for a source or manufacturer.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::codec::producer_payload;
use crate::config::ProtocolConfig;
use crate::crypto::{sign, KeyPair};
use crate::error::{FormatError, SignError, ValidationError};
use crate::projection::FlatProducer;
use crate::record::{
    require_name, require_public_key, require_signature, require_verified, Record, RecordKind,
    Signer,
};
use crate::types::Version;
use crate::validation::check_private_key;

/// A producer record.
///
/// Starts unsigned (empty `signature`); [`Producer::sign`] fills the
/// signature. Changing any field afterwards without signing again makes the
/// record invalid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "FlatProducer", into = "FlatProducer")]
pub struct Producer {
    /// Hex public key identifying the producer.
    pub public_key: String,
    /// Protocol version the record was built for.
    pub version: Version,
    /// Human readable name.
    pub name: String,
    /// Hex signature over the payload by `public_key`; empty while unsigned.
    pub signature: String,
}

impl Producer {
    /// An unsigned producer with an explicit version.
    pub fn unsigned(public_key: impl Into<String>, version: Version, name: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            version,
            name: name.into(),
            signature: String::new(),
        }
    }

    /// An unsigned producer at the configured current version.
    pub fn new(config: &ProtocolConfig, public_key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::unsigned(public_key, config.current_version, name)
    }

    /// Whether a signature has been filled in (not whether it verifies).
    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    /// Sign the producer with its private key.
    ///
    /// On a failed precondition nothing is modified. If the fresh signature
    /// fails the immediate self-check it is cleared again. Either way the
    /// error is logged and returned; it is never fatal.
    ///
    /// The version is not checked here: a record built for another protocol
    /// version can be signed, it just won't be valid under this one.
    pub fn sign(&mut self, private_key: &str) -> Result<(), SignError> {
        let result = self.try_sign(private_key);
        if let Err(e) = &result {
            warn!(producer = %self.public_key, error = %e, "producer not signed");
        }
        result
    }

    fn try_sign(&mut self, private_key: &str) -> Result<(), SignError> {
        require_public_key("public_key", &self.public_key)?;
        require_name(&self.name)?;
        if !check_private_key(private_key) {
            return Err(FormatError::PrivateKey {
                signer: Signer::Own,
            }
            .into());
        }

        let payload = self.payload();
        self.signature = sign(private_key, payload.as_bytes())?;

        if let Err(e) = self.verify_signatures() {
            self.signature.clear();
            return Err(SignError::SelfCheck(e));
        }
        Ok(())
    }
}

impl Record for Producer {
    fn kind(&self) -> RecordKind {
        RecordKind::Producer
    }

    fn public_key(&self) -> &str {
        &self.public_key
    }

    fn version(&self) -> Version {
        self.version
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn payload(&self) -> String {
        producer_payload(&self.public_key, &self.version, &self.name)
    }

    fn verify_signatures(&self) -> Result<(), ValidationError> {
        require_public_key("public_key", &self.public_key)?;
        require_name(&self.name)?;
        require_signature("signature", &self.signature)?;

        let payload = self.payload();
        require_verified(Signer::Own, &self.public_key, payload.as_bytes(), &self.signature)
    }
}

/// Create and sign a producer with a freshly generated key pair.
///
/// Returns the signed producer and its hex private key. The private key is
/// not stored anywhere else; losing it means the producer can never co-sign
/// a product.
pub fn new_producer(config: &ProtocolConfig, name: &str) -> Result<(Producer, String), SignError> {
    if let Err(e) = require_name(name) {
        warn!(error = %e, "refusing to create producer");
        return Err(e.into());
    }

    let keys = KeyPair::generate();
    let mut producer = Producer::new(config, keys.public_key(), name);
    producer.sign(&keys.private_key())?;

    Ok((producer, keys.private_key()))
}
