//! Flat key/value projection of records.
//!
//! This is the JSON shape exchanged with record stores. The version is
//! spread over three integer fields and input lists are plain arrays:
//!
//! ```json
//! {
//!   "public_key": "…", "version_major": 0, "version_minor": 0, "version_patch": 0,
//!   "name": "Bolt", "producer_public_key": "…", "input_pub_keys": ["…"],
//!   "product_signature": "…", "producer_signature": "…", "input_signatures": ["…"]
//! }
//! ```
//!
//! Deserialization accepts the legacy `pub_key` / `producer_pub_key` names
//! and treats a missing or `null` list as empty. Nothing is validated here;
//! a decoded record is checked with [`Record::check`](crate::record::Record::check).

use serde::{Deserialize, Deserializer, Serialize};

use crate::producer::Producer;
use crate::product::Product;
use crate::types::Version;

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Wire shape of a [`Producer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatProducer {
    #[serde(alias = "pub_key")]
    pub public_key: String,
    pub version_major: u32,
    pub version_minor: u32,
    pub version_patch: u32,
    pub name: String,
    #[serde(default)]
    pub signature: String,
}

/// Wire shape of a [`Product`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatProduct {
    #[serde(alias = "pub_key")]
    pub public_key: String,
    pub version_major: u32,
    pub version_minor: u32,
    pub version_patch: u32,
    pub name: String,
    #[serde(alias = "producer_pub_key")]
    pub producer_public_key: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub input_pub_keys: Vec<String>,
    #[serde(default)]
    pub product_signature: String,
    #[serde(default)]
    pub producer_signature: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub input_signatures: Vec<String>,
}

impl From<Producer> for FlatProducer {
    fn from(p: Producer) -> Self {
        Self {
            public_key: p.public_key,
            version_major: p.version.major,
            version_minor: p.version.minor,
            version_patch: p.version.patch,
            name: p.name,
            signature: p.signature,
        }
    }
}

impl From<FlatProducer> for Producer {
    fn from(f: FlatProducer) -> Self {
        Self {
            public_key: f.public_key,
            version: Version::new(f.version_major, f.version_minor, f.version_patch),
            name: f.name,
            signature: f.signature,
        }
    }
}

impl From<Product> for FlatProduct {
    fn from(p: Product) -> Self {
        Self {
            public_key: p.public_key,
            version_major: p.version.major,
            version_minor: p.version.minor,
            version_patch: p.version.patch,
            name: p.name,
            producer_public_key: p.producer_public_key,
            input_pub_keys: p.input_public_keys,
            product_signature: p.product_signature,
            producer_signature: p.producer_signature,
            input_signatures: p.input_signatures,
        }
    }
}

impl From<FlatProduct> for Product {
    fn from(f: FlatProduct) -> Self {
        Self {
            public_key: f.public_key,
            version: Version::new(f.version_major, f.version_minor, f.version_patch),
            name: f.name,
            producer_public_key: f.producer_public_key,
            input_public_keys: f.input_pub_keys,
            product_signature: f.product_signature,
            producer_signature: f.producer_signature,
            input_signatures: f.input_signatures,
        }
    }
}
