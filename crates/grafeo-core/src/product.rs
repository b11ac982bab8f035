//! Product: a good, co-signed by its producer and by the holders of its inputs.
//!
//! A product names its producer and its inputs (earlier products) by public
//! key. Those references form a DAG, but validity only looks one hop out:
//! every listed key must have signed this product's payload. The inputs'
//! own records are not re-validated.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::codec::product_payload;
use crate::config::ProtocolConfig;
use crate::crypto::{sign, KeyPair};
use crate::error::{FormatError, SignError, ValidationError};
use crate::projection::FlatProduct;
use crate::record::{
    require_name, require_public_key, require_signature, require_verified, Record, RecordKind,
    Signer,
};
use crate::types::Version;
use crate::validation::check_private_key;

/// A product record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "FlatProduct", into = "FlatProduct")]
pub struct Product {
    /// Hex public key identifying the product.
    pub public_key: String,
    /// Protocol version the record was built for.
    pub version: Version,
    /// Human readable name.
    pub name: String,
    /// Public key of the producer that made it.
    pub producer_public_key: String,
    /// Public keys of the products it was made from, in order.
    pub input_public_keys: Vec<String>,
    /// Signature by `public_key`; empty while unsigned.
    pub product_signature: String,
    /// Signature by `producer_public_key`; empty while unsigned.
    pub producer_signature: String,
    /// `input_signatures[i]` is by `input_public_keys[i]`, over this
    /// product's payload.
    pub input_signatures: Vec<String>,
}

impl Product {
    /// An unsigned product with an explicit version.
    pub fn unsigned(
        public_key: impl Into<String>,
        version: Version,
        name: impl Into<String>,
        producer_public_key: impl Into<String>,
        input_public_keys: Vec<String>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            version,
            name: name.into(),
            producer_public_key: producer_public_key.into(),
            input_public_keys,
            product_signature: String::new(),
            producer_signature: String::new(),
            input_signatures: Vec::new(),
        }
    }

    /// An unsigned product at the configured current version.
    pub fn new(
        config: &ProtocolConfig,
        public_key: impl Into<String>,
        name: impl Into<String>,
        producer_public_key: impl Into<String>,
        input_public_keys: Vec<String>,
    ) -> Self {
        Self::unsigned(
            public_key,
            config.current_version,
            name,
            producer_public_key,
            input_public_keys,
        )
    }

    /// Whether any signature has been filled in.
    pub fn is_signed(&self) -> bool {
        !self.product_signature.is_empty()
            || !self.producer_signature.is_empty()
            || !self.input_signatures.is_empty()
    }

    /// Iterate over the input public keys.
    pub fn input_public_keys(&self) -> impl Iterator<Item = &str> {
        self.input_public_keys.iter().map(String::as_str)
    }

    /// Whether `public_key` is one of this product's inputs.
    pub fn has_input(&self, public_key: &str) -> bool {
        self.input_public_keys().any(|k| k == public_key)
    }

    /// Whether this product names `producer_public_key` as its producer.
    pub fn is_made_by(&self, producer_public_key: &str) -> bool {
        self.producer_public_key == producer_public_key
    }

    /// Compute all signatures of the product.
    ///
    /// `input_private_keys[i]` signs for `input_public_keys[i]`. Only the
    /// counts are compared; a key in the wrong slot is caught by the
    /// self-check, not by the preconditions.
    ///
    /// Signing is all or nothing: on any failure no signature field holds a
    /// new value, and a failed self-check clears all of them.
    pub fn sign<S: AsRef<str>>(
        &mut self,
        own_private_key: &str,
        producer_private_key: &str,
        input_private_keys: &[S],
    ) -> Result<(), SignError> {
        let result = self.try_sign(own_private_key, producer_private_key, input_private_keys);
        if let Err(e) = &result {
            warn!(product = %self.public_key, error = %e, "product not signed");
        }
        result
    }

    fn check_signing_inputs<S: AsRef<str>>(
        &self,
        own_private_key: &str,
        producer_private_key: &str,
        input_private_keys: &[S],
    ) -> Result<(), ValidationError> {
        require_name(&self.name)?;
        require_public_key("public_key", &self.public_key)?;
        require_public_key("producer_public_key", &self.producer_public_key)?;
        require_private_key(Signer::Own, own_private_key)?;
        require_private_key(Signer::Producer, producer_private_key)?;

        if self.input_public_keys.len() != input_private_keys.len() {
            return Err(ValidationError::CountMismatch {
                keys: self.input_public_keys.len(),
                signatures: input_private_keys.len(),
            });
        }
        for key in &self.input_public_keys {
            require_public_key("input_pub_keys", key)?;
        }
        for (i, key) in input_private_keys.iter().enumerate() {
            require_private_key(Signer::Input(i), key.as_ref())?;
        }
        Ok(())
    }

    fn try_sign<S: AsRef<str>>(
        &mut self,
        own_private_key: &str,
        producer_private_key: &str,
        input_private_keys: &[S],
    ) -> Result<(), SignError> {
        self.check_signing_inputs(own_private_key, producer_private_key, input_private_keys)?;

        // One payload for every signer.
        let payload = self.payload();
        let message = payload.as_bytes();

        let product_signature = sign(own_private_key, message)?;
        let producer_signature = sign(producer_private_key, message)?;
        let input_signatures = input_private_keys
            .iter()
            .map(|key| sign(key.as_ref(), message))
            .collect::<Result<Vec<_>, _>>()?;

        self.product_signature = product_signature;
        self.producer_signature = producer_signature;
        self.input_signatures = input_signatures;

        if let Err(e) = self.verify_signatures() {
            self.clear_signatures();
            return Err(SignError::SelfCheck(e));
        }
        Ok(())
    }

    fn clear_signatures(&mut self) {
        self.product_signature.clear();
        self.producer_signature.clear();
        self.input_signatures.clear();
    }
}

fn require_private_key(signer: Signer, key: &str) -> Result<(), FormatError> {
    if check_private_key(key) {
        Ok(())
    } else {
        Err(FormatError::PrivateKey { signer })
    }
}

impl Record for Product {
    fn kind(&self) -> RecordKind {
        RecordKind::Product
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
        product_payload(
            &self.public_key,
            &self.version,
            &self.name,
            &self.producer_public_key,
            &self.input_public_keys,
        )
    }

    fn verify_signatures(&self) -> Result<(), ValidationError> {
        // Structure
        require_public_key("public_key", &self.public_key)?;
        require_name(&self.name)?;
        require_public_key("producer_public_key", &self.producer_public_key)?;

        if self.input_public_keys.len() != self.input_signatures.len() {
            return Err(ValidationError::CountMismatch {
                keys: self.input_public_keys.len(),
                signatures: self.input_signatures.len(),
            });
        }

        require_signature("product_signature", &self.product_signature)?;
        require_signature("producer_signature", &self.producer_signature)?;
        for signature in &self.input_signatures {
            require_signature("input_signatures", signature)?;
        }
        for key in &self.input_public_keys {
            require_public_key("input_pub_keys", key)?;
        }

        // Signatures, all over the same payload
        let payload = self.payload();
        let message = payload.as_bytes();

        require_verified(Signer::Own, &self.public_key, message, &self.product_signature)?;
        require_verified(
            Signer::Producer,
            &self.producer_public_key,
            message,
            &self.producer_signature,
        )?;
        for (i, (key, signature)) in self
            .input_public_keys
            .iter()
            .zip(&self.input_signatures)
            .enumerate()
        {
            require_verified(Signer::Input(i), key, message, signature)?;
        }
        Ok(())
    }
}

/// Create and sign a product with a freshly generated key pair.
///
/// The producer and every input holder sign the new product's payload.
/// Returns the signed product and its hex private key, which the caller
/// needs later to let the product act as an input.
pub fn new_product<S: AsRef<str>>(
    config: &ProtocolConfig,
    name: &str,
    producer_public_key: &str,
    producer_private_key: &str,
    input_public_keys: &[S],
    input_private_keys: &[S],
) -> Result<(Product, String), SignError> {
    let keys = KeyPair::generate();
    let private_key = keys.private_key();

    let mut product = Product::new(
        config,
        keys.public_key(),
        name,
        producer_public_key,
        input_public_keys
            .iter()
            .map(|k| k.as_ref().to_string())
            .collect(),
    );
    product.sign(&private_key, producer_private_key, input_private_keys)?;

    Ok((product, private_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::new_producer;

    const NONE: [&str; 0] = [];

    fn config() -> ProtocolConfig {
        ProtocolConfig::default()
    }

    struct Setup {
        producer_public_key: String,
        producer_private_key: String,
    }

    fn setup() -> Setup {
        let (producer, producer_private_key) = new_producer(&config(), "Acme").unwrap();
        Setup {
            producer_public_key: producer.public_key,
            producer_private_key,
        }
    }

    fn base_product(s: &Setup) -> (Product, String) {
        new_product(
            &config(),
            "Base",
            &s.producer_public_key,
            &s.producer_private_key,
            &NONE,
            &NONE,
        )
        .unwrap()
    }

    #[test]
    fn test_product_without_inputs_is_valid() {
        let s = setup();
        let (product, _) = base_product(&s);

        assert!(product.is_valid());
        assert!(product.input_signatures.is_empty());
        assert!(product.is_made_by(&s.producer_public_key));
    }

    #[test]
    fn test_product_with_input_is_valid() {
        let s = setup();
        let (a, a_key) = base_product(&s);

        let (b, _) = new_product(
            &config(),
            "Assembly",
            &s.producer_public_key,
            &s.producer_private_key,
            &[a.public_key.as_str()],
            &[a_key.as_str()],
        )
        .unwrap();

        assert!(b.is_valid());
        assert!(b.has_input(&a.public_key));
        assert_eq!(b.input_signatures.len(), 1);
        // The input holder signed B's payload, not A's.
        assert!(crate::crypto::verify(
            &a.public_key,
            b.payload().as_bytes(),
            &b.input_signatures[0]
        ));
    }

    #[test]
    fn test_missing_input_key_leaves_product_unsigned() {
        let s = setup();
        let (a, _) = base_product(&s);

        let keys = KeyPair::generate();
        let mut b = Product::new(
            &config(),
            keys.public_key(),
            "Assembly",
            s.producer_public_key.clone(),
            vec![a.public_key.clone()],
        );
        let before = b.clone();

        let result = b.sign(&keys.private_key(), &s.producer_private_key, &NONE);
        assert_eq!(
            result,
            Err(SignError::Precondition(ValidationError::CountMismatch {
                keys: 1,
                signatures: 0
            }))
        );
        assert_eq!(b, before);
        assert!(!b.is_signed());
    }

    #[test]
    fn test_three_inputs_two_keys_fails_without_mutation() {
        let s = setup();
        let inputs: Vec<(Product, String)> = (0..3).map(|_| base_product(&s)).collect();
        let input_public: Vec<String> = inputs.iter().map(|(p, _)| p.public_key.clone()).collect();
        let input_private: Vec<String> = inputs.iter().take(2).map(|(_, k)| k.clone()).collect();

        let keys = KeyPair::generate();
        let mut product = Product::new(
            &config(),
            keys.public_key(),
            "Kit",
            s.producer_public_key.clone(),
            input_public,
        );

        assert!(product
            .sign(&keys.private_key(), &s.producer_private_key, &input_private)
            .is_err());
        assert!(product.product_signature.is_empty());
        assert!(product.producer_signature.is_empty());
        assert!(product.input_signatures.is_empty());
    }

    #[test]
    fn test_swapped_input_keys_fail_self_check() {
        let s = setup();
        let (a, a_key) = base_product(&s);
        let (b, b_key) = base_product(&s);

        let keys = KeyPair::generate();
        let mut product = Product::new(
            &config(),
            keys.public_key(),
            "Kit",
            s.producer_public_key.clone(),
            vec![a.public_key.clone(), b.public_key.clone()],
        );

        let result = product.sign(&keys.private_key(), &s.producer_private_key, &[b_key, a_key]);
        assert_eq!(
            result,
            Err(SignError::SelfCheck(ValidationError::CryptoMismatch {
                signer: Signer::Input(0)
            }))
        );
        assert!(!product.is_signed());
    }

    #[test]
    fn test_wrong_producer_key_fails_self_check() {
        let s = setup();
        let stranger = KeyPair::generate();
        let keys = KeyPair::generate();
        let mut product = Product::new(
            &config(),
            keys.public_key(),
            "Bolt",
            s.producer_public_key.clone(),
            Vec::new(),
        );

        let result = product.sign(&keys.private_key(), &stranger.private_key(), &NONE);
        assert!(matches!(
            result,
            Err(SignError::SelfCheck(ValidationError::CryptoMismatch {
                signer: Signer::Producer
            }))
        ));
        assert!(!product.is_signed());
    }

    #[test]
    fn test_tampering_invalidates() {
        let s = setup();
        let (a, a_key) = base_product(&s);
        let (product, _) = new_product(
            &config(),
            "Assembly",
            &s.producer_public_key,
            &s.producer_private_key,
            &[a.public_key.as_str()],
            &[a_key.as_str()],
        )
        .unwrap();

        let mut renamed = product.clone();
        renamed.name = "Assembly2".into();
        assert!(!renamed.is_valid());

        let mut dropped = product.clone();
        dropped.input_public_keys.clear();
        assert!(matches!(
            dropped.check(&config()),
            Err(ValidationError::CountMismatch { keys: 0, signatures: 1 })
        ));

        let mut both_dropped = product.clone();
        both_dropped.input_public_keys.clear();
        both_dropped.input_signatures.clear();
        assert!(!both_dropped.is_valid());

        let mut reassigned = product.clone();
        reassigned.producer_public_key = a.public_key.clone();
        assert!(!reassigned.is_valid());
    }

    #[test]
    fn test_every_flipped_signature_char_invalidates() {
        let s = setup();
        let (a, a_key) = base_product(&s);
        let (product, _) = new_product(
            &config(),
            "Assembly",
            &s.producer_public_key,
            &s.producer_private_key,
            &[a.public_key.as_str()],
            &[a_key.as_str()],
        )
        .unwrap();

        fn flip(sig: &mut String, i: usize) {
            let mut chars: Vec<char> = sig.chars().collect();
            chars[i] = if chars[i] == 'f' { 'e' } else { 'f' };
            *sig = chars.into_iter().collect();
        }

        for i in 0..128 {
            let mut t = product.clone();
            flip(&mut t.product_signature, i);
            assert!(!t.is_valid());

            let mut t = product.clone();
            flip(&mut t.producer_signature, i);
            assert!(!t.is_valid());

            let mut t = product.clone();
            flip(&mut t.input_signatures[0], i);
            assert!(!t.is_valid());
        }
    }

    #[test]
    fn test_separator_in_name_rejected() {
        let s = setup();
        let result = new_product(
            &config(),
            "Bolt;;0,,0,,0",
            &s.producer_public_key,
            &s.producer_private_key,
            &NONE,
            &NONE,
        );
        assert!(matches!(
            result,
            Err(SignError::Precondition(ValidationError::Format(FormatError::Name)))
        ));
    }

    #[test]
    fn test_malformed_input_private_key_reported() {
        let s = setup();
        let (a, _) = base_product(&s);
        let result = new_product(
            &config(),
            "Assembly",
            &s.producer_public_key,
            &s.producer_private_key,
            &[a.public_key.as_str()],
            &["zz"],
        );
        assert_eq!(
            result.unwrap_err(),
            SignError::Precondition(ValidationError::Format(FormatError::PrivateKey {
                signer: Signer::Input(0)
            }))
        );
    }

    #[test]
    fn test_other_version_is_invalid() {
        let s = setup();
        let keys = KeyPair::generate();
        let mut product = Product::unsigned(
            keys.public_key(),
            Version::new(1, 0, 0),
            "Bolt",
            s.producer_public_key.clone(),
            Vec::new(),
        );

        product
            .sign(&keys.private_key(), &s.producer_private_key, &NONE)
            .unwrap();
        assert!(product.verify_signatures().is_ok());
        assert!(!product.is_valid());
    }

    #[test]
    fn test_is_valid_never_mutates() {
        let s = setup();
        let (mut product, _) = base_product(&s);
        product.input_signatures.push("garbage".into());
        let before = product.clone();

        assert!(!product.is_valid());
        assert!(!product.is_valid());
        assert_eq!(product, before);
    }
}
