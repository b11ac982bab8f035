//! # Grafeo
//!
//! The unified API for Grafeo - cryptographically authenticated supply
//! chain records.
//!
//! ## Overview
//!
//! Grafeo provides:
//!
//! - **Producers**: Self-signed identities of manufacturers and sources
//! - **Products**: Goods co-signed by their producer and by the holders of
//!   every input product they were made from
//! - **Registry**: Storage that only ever accepts and returns valid records
//!
//! ## Key Concepts
//!
//! - **Payload**: The canonical string every signature covers.
//! - **Validity**: Version match plus every signature verifying over the payload.
//! - **Provenance**: Products name their producer and inputs by public key,
//!   forming a graph that is followed one hop at a time.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use grafeo::{Registry, RegistryConfig};
//! use grafeo::store::SqliteStore;
//!
//! async fn example() {
//!     // Open storage
//!     let store = SqliteStore::open("grafeo.db").unwrap();
//!
//!     // Create the registry
//!     let registry = Registry::new(store, RegistryConfig::default());
//!
//!     // Register a producer and something it makes
//!     let (mill, mill_key) = registry.create_producer("Mill").await.unwrap();
//!     let (wheat, wheat_key) = registry
//!         .create_product("Wheat", &mill, &mill_key, &[])
//!         .await
//!         .unwrap();
//!
//!     // Products made from other products are co-signed by their holders
//!     let (flour, _) = registry
//!         .create_product("Flour", &mill, &mill_key, &[(&wheat, wheat_key.as_str())])
//!         .await
//!         .unwrap();
//!
//!     let fetched = registry.get_product(&flour.public_key).await.unwrap();
//!     assert_eq!(fetched, Some(flour));
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `grafeo::core` - Keys, payloads, producers and products
//! - `grafeo::store` - Storage abstraction, SQLite and remote backends

pub mod error;
pub mod registry;

// Re-export component crates
pub use grafeo_core as core;
pub use grafeo_store as store;

// Re-export main types for convenience
pub use error::{RegistryError, Result};
pub use registry::{PostResult, Registry, RegistryConfig};

// Re-export commonly used core types
pub use grafeo_core::{
    new_producer, new_product, AnyRecord, KeyPair, Producer, Product, ProtocolConfig, Record,
    RecordKind, Version,
};
