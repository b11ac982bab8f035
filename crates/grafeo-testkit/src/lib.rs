//! # Grafeo Testkit
//!
//! Testing utilities for Grafeo.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed-seed records with expected payloads and signatures
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up test scenarios
//!
//! ## Golden Vectors
//!
//! Golden vectors pin down the payload encoding and the signatures over it:
//!
//! ```rust
//! use grafeo_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches) in verify_all_vectors() {
//!     assert!(matches, "{}", name);
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use grafeo_core::Record;
//! use grafeo_testkit::generators::{product_from_params, ProductParams};
//!
//! proptest! {
//!     #[test]
//!     fn signed_products_are_valid(params: ProductParams) {
//!         prop_assert!(product_from_params(&params).is_valid());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use grafeo_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let mill = fixture.make_producer("Mill");
//! let wheat = fixture.make_product("Wheat", &mill, &[]);
//! let flour = fixture.make_product("Flour", &mill, &[&wheat]);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_keys, Signed, TestFixture};
pub use generators::{product_from_params, producer_from_params, ProducerParams, ProductParams};
pub use vectors::{product_vectors, producer_vectors, verify_all_vectors};
