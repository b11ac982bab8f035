//! Key pairs and the signature engine.
//!
//! Wraps Ed25519 signing behind the hex-string surface used by records:
//! public keys and private seeds are 64 lowercase hex characters,
//! signatures are 128.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use std::fmt;

use crate::error::CryptoError;
use crate::validation::{check_private_key, check_public_key, check_signature};

/// A freshly generated or re-derived signing key pair.
///
/// The private key exists only in the caller's process. It is never part
/// of a record and is redacted from `Debug` output.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random key pair from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut rng = rand::rngs::OsRng;
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Re-derive the key pair belonging to a hex private key.
    pub fn from_private_key(private_key: &str) -> Result<Self, CryptoError> {
        let signing_key = signing_key(private_key)?;
        Ok(Self { signing_key })
    }

    /// The public key as 64 lowercase hex characters.
    pub fn public_key(&self) -> String {
        hex::encode(self.signing_key.verifying_key().to_bytes())
    }

    /// The private seed as 64 lowercase hex characters.
    pub fn private_key(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// Sign a message with this pair's private key.
    pub fn sign(&self, message: &[u8]) -> String {
        hex::encode(self.signing_key.sign(message).to_bytes())
    }
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.signing_key.to_bytes() == other.signing_key.to_bytes()
    }
}

impl Eq for KeyPair {}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair({}..)", &self.public_key()[..16])
    }
}

fn signing_key(private_key: &str) -> Result<SigningKey, CryptoError> {
    if !check_private_key(private_key) {
        return Err(CryptoError::InvalidPrivateKey);
    }
    let mut seed = [0u8; 32];
    hex::decode_to_slice(private_key, &mut seed).map_err(|_| CryptoError::InvalidPrivateKey)?;
    Ok(SigningKey::from_bytes(&seed))
}

fn verifying_key(public_key: &str) -> Result<VerifyingKey, CryptoError> {
    if !check_public_key(public_key) {
        return Err(CryptoError::InvalidPublicKey);
    }
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(public_key, &mut bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
    VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)
}

fn signature(signature: &str) -> Result<Signature, CryptoError> {
    if !check_signature(signature) {
        return Err(CryptoError::InvalidSignature);
    }
    let mut bytes = [0u8; 64];
    hex::decode_to_slice(signature, &mut bytes).map_err(|_| CryptoError::InvalidSignature)?;
    Ok(Signature::from_bytes(&bytes))
}

/// Generate a fresh key pair.
pub fn generate_key_pair() -> KeyPair {
    KeyPair::generate()
}

/// Sign `message` with a hex private key.
///
/// Ed25519 signatures are deterministic: the same key and message always
/// produce the same signature.
pub fn sign(private_key: &str, message: &[u8]) -> Result<String, CryptoError> {
    let key = signing_key(private_key)?;
    Ok(hex::encode(key.sign(message).to_bytes()))
}

/// Check a signature, reporting why it failed.
///
/// Uses `verify_strict`: small-order public keys and non-canonical
/// signatures are rejected, so no signature verifies without the private key.
pub fn verify_detailed(public_key: &str, message: &[u8], sig: &str) -> Result<(), CryptoError> {
    let key = verifying_key(public_key)?;
    let sig = signature(sig)?;
    key.verify_strict(message, &sig)
        .map_err(|_| CryptoError::InvalidSignature)
}

/// True iff `signature` was made by the owner of `public_key` over exactly
/// `message`. Malformed input of any kind yields `false`.
pub fn verify(public_key: &str, message: &[u8], signature: &str) -> bool {
    verify_detailed(public_key, message, signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MESSAGE: &str = "I am a weird string |{]}][|¢[|     漢語";

    #[test]
    fn test_generate_key_pair_formats() {
        for _ in 0..100 {
            let pair = generate_key_pair();
            assert!(check_public_key(&pair.public_key()));
            assert!(check_private_key(&pair.private_key()));
        }
    }

    #[test]
    fn test_generated_pairs_differ() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_keypair_deterministic_from_seed() {
        let kp1 = KeyPair::from_seed(&[0x42; 32]);
        let kp2 = KeyPair::from_seed(&[0x42; 32]);
        assert_eq!(kp1, kp2);
        assert_eq!(kp1.private_key(), "42".repeat(32));
    }

    #[test]
    fn test_from_private_key_rederives_public_key() {
        let pair = KeyPair::generate();
        let again = KeyPair::from_private_key(&pair.private_key()).unwrap();
        assert_eq!(pair.public_key(), again.public_key());
    }

    #[test]
    fn test_from_private_key_rejects_garbage() {
        assert_eq!(
            KeyPair::from_private_key("not a key"),
            Err(CryptoError::InvalidPrivateKey)
        );
    }

    #[test]
    fn test_sign_verify() {
        let pair = KeyPair::generate();
        let sig = sign(&pair.private_key(), MESSAGE.as_bytes()).unwrap();

        assert!(check_signature(&sig));
        assert!(verify(&pair.public_key(), MESSAGE.as_bytes(), &sig));

        // Tampered message should fail
        assert!(!verify(&pair.public_key(), b"something else", &sig));
    }

    #[test]
    fn test_sign_is_deterministic() {
        let pair = KeyPair::from_seed(&[0x07; 32]);
        assert_eq!(pair.sign(b"payload"), pair.sign(b"payload"));
    }

    #[test]
    fn test_sign_rejects_malformed_private_key() {
        assert_eq!(sign("abc", b"m"), Err(CryptoError::InvalidPrivateKey));
        assert_eq!(
            sign(&"A".repeat(64), b"m"),
            Err(CryptoError::InvalidPrivateKey)
        );
    }

    #[test]
    fn test_verify_flipped_character_fails() {
        let pair = KeyPair::generate();
        let sig = pair.sign(MESSAGE.as_bytes());

        let mut chars: Vec<char> = sig.chars().collect();
        chars[34] = if chars[34] == 'b' { 'a' } else { 'b' };
        let flipped: String = chars.iter().collect();
        assert!(!verify(&pair.public_key(), MESSAGE.as_bytes(), &flipped));

        chars[100] = 'k';
        let malformed: String = chars.into_iter().collect();
        assert!(!check_signature(&malformed));
        assert!(!verify(&pair.public_key(), MESSAGE.as_bytes(), &malformed));
    }

    #[test]
    fn test_verify_never_panics_on_garbage() {
        let pair = KeyPair::generate();
        let sig = pair.sign(b"m");

        assert!(!verify("", b"m", &sig));
        assert!(!verify(&pair.public_key(), b"m", ""));
        assert!(!verify(&"z".repeat(64), b"m", &sig));
        assert!(!verify(&pair.public_key(), b"m", &"0".repeat(128)));
        // Right shape, wrong key material.
        assert!(!verify(&"f".repeat(64), b"m", &sig));
    }

    #[test]
    fn test_verify_with_wrong_key() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        let sig = a.sign(b"m");
        assert_eq!(
            verify_detailed(&b.public_key(), b"m", &sig),
            Err(CryptoError::InvalidSignature)
        );
    }

    #[test]
    fn test_small_order_key_rejected() {
        // The identity point: a non-strict check accepts this pair for any message.
        let identity = format!("01{}", "00".repeat(31));
        let sig = format!("01{}", "00".repeat(63));

        for message in [&b"Acme"[..], b"Anything", b""] {
            assert!(!verify(&identity, message, &sig));
        }
        assert_eq!(
            verify_detailed(&identity, b"Acme", &sig),
            Err(CryptoError::InvalidSignature)
        );
    }

    #[test]
    fn test_rfc8032_vector() {
        let pair = KeyPair::from_private_key(
            "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
        )
        .unwrap();
        assert_eq!(
            pair.public_key(),
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"
        );
        assert_eq!(
            pair.sign(b""),
            "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155\
             5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
        );
    }

    #[test]
    fn test_debug_hides_private_key() {
        let pair = KeyPair::from_seed(&[0x11; 32]);
        let debug = format!("{:?}", pair);
        assert!(debug.starts_with("KeyPair("));
        assert!(!debug.contains(&pair.private_key()));
    }

    proptest! {
        #[test]
        fn test_sign_then_verify(seed in any::<[u8; 32]>(), message in prop::collection::vec(any::<u8>(), 0..256)) {
            let pair = KeyPair::from_seed(&seed);
            let sig = sign(&pair.private_key(), &message).unwrap();
            prop_assert!(verify(&pair.public_key(), &message, &sig));
        }

        #[test]
        fn test_verify_arbitrary_strings_is_false(
            public_key in "\\PC{0,80}",
            signature in "\\PC{0,140}",
        ) {
            prop_assert!(!verify(&public_key, b"m", &signature));
        }
    }
}
