//! # Grafeo Core
//!
//! Pure primitives for Grafeo, a cryptographically authenticated supply
//! chain record protocol: key pairs, signatures, canonical payloads, and
//! the producer and product records built from them.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`KeyPair`] - Ed25519 keys as lowercase hex strings
//! - [`Producer`] - A self-signed source or manufacturer
//! - [`Product`] - A good, co-signed by its producer and its inputs' holders
//! - [`Record`] - Payload and validity, shared by both
//! - [`ProtocolConfig`] - The protocol version records are checked against
//!
//! ## Payloads
//!
//! Every signature covers a record's canonical payload, its fields joined by
//! reserved separators. See the [`codec`] module.
//!
//! ## Usage
//!
//! ```rust
//! use grafeo_core::{new_producer, new_product, ProtocolConfig, Record};
//!
//! let config = ProtocolConfig::default();
//! let (producer, producer_key) = new_producer(&config, "Acme").unwrap();
//!
//! let no_inputs: [&str; 0] = [];
//! let (bolt, bolt_key) = new_product(
//!     &config, "Bolt", &producer.public_key, &producer_key, &no_inputs, &no_inputs,
//! ).unwrap();
//!
//! let (frame, _) = new_product(
//!     &config,
//!     "Frame",
//!     &producer.public_key,
//!     &producer_key,
//!     &[bolt.public_key.as_str()],
//!     &[bolt_key.as_str()],
//! ).unwrap();
//!
//! assert!(producer.is_valid());
//! assert!(frame.is_valid());
//! ```

pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod producer;
pub mod product;
pub mod projection;
pub mod record;
pub mod types;
pub mod validation;

pub use codec::{product_payload, producer_payload, Separators, SEPARATORS};
pub use config::ProtocolConfig;
pub use crypto::{generate_key_pair, sign, verify, KeyPair};
pub use error::{CryptoError, FormatError, SignError, ValidationError};
pub use producer::{new_producer, Producer};
pub use product::{new_product, Product};
pub use projection::{FlatProducer, FlatProduct};
pub use record::{AnyRecord, Record, RecordKind, Signer};
pub use types::Version;
pub use validation::{check_name, check_private_key, check_public_key, check_signature};
