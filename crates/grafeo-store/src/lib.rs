//! # Grafeo Store
//!
//! Storage abstraction for Grafeo. Provides a trait-based interface for
//! producer and product persistence with in-memory, SQLite and remote
//! implementations.
//!
//! ## Overview
//!
//! The store module abstracts record storage behind the [`Store`] trait,
//! allowing the registry to be storage-agnostic. [`SqliteStore`] is the
//! local cache, [`RemoteStore`] talks to a registry server over HTTP/JSON,
//! and [`MemoryStore`] is for tests.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`ProvenanceIndex`] - One-hop queries over the provenance graph
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`RemoteStore`] - HTTP/JSON backend behind an [`HttpClient`]; the
//!   `http` feature adds a reqwest-backed client
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`InsertResult`] - Result of inserting a record
//!
//! ## Usage
//!
//! ```rust,no_run
//! use grafeo_core::{new_producer, ProtocolConfig};
//! use grafeo_store::{SqliteStore, Store};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("grafeo.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     let (producer, _key) = new_producer(&ProtocolConfig::default(), "Acme").unwrap();
//!     store.insert_producer(&producer).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Idempotent inserts**: Inserting the same record twice returns `AlreadyExists`
//! - **Conflict detection**: A different record under the same key returns `Conflict`
//! - **No validation**: Stores never judge records; the registry does

pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod memory;
pub mod migration;
pub mod remote;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
#[cfg(feature = "http")]
pub use http::ReqwestClient;
pub use memory::MemoryStore;
pub use remote::{HttpClient, HttpResponse, RemoteConfig, RemoteStore};
pub use sqlite::SqliteStore;
pub use traits::{InsertResult, ProvenanceIndex, Store, StoreExt};
