//! Store traits: the abstract interface for record persistence.
//!
//! These traits keep the registry storage-agnostic. Implementations include
//! an in-memory map (tests), a SQLite cache (local), and a remote HTTP/JSON
//! backend.

use async_trait::async_trait;
use grafeo_core::{AnyRecord, Producer, Product, RecordKind};

use crate::error::Result;

/// Result of inserting a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Record was inserted successfully.
    Inserted,
    /// The identical record already exists (idempotent - not an error).
    AlreadyExists,
    /// A different record is already stored under the same public key.
    Conflict,
}

/// The Store trait: async interface for record persistence.
///
/// Stores are keyed by public key, one namespace per [`RecordKind`].
///
/// # Design Notes
///
/// - **No validation**: stores keep and return whatever they are given.
///   Validity is enforced one level up, by the registry, on both the way in
///   and the way out.
/// - **Idempotent inserts**: inserting the same record twice returns `AlreadyExists`.
/// - **No overwrite**: a different record under an existing key returns
///   `Conflict` and leaves the stored one in place.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a producer.
    async fn insert_producer(&self, producer: &Producer) -> Result<InsertResult>;

    /// Insert a product.
    async fn insert_product(&self, product: &Product) -> Result<InsertResult>;

    /// Get a producer by public key.
    async fn get_producer(&self, public_key: &str) -> Result<Option<Producer>>;

    /// Get a product by public key.
    async fn get_product(&self, public_key: &str) -> Result<Option<Product>>;
}

/// One-hop queries over the provenance graph.
///
/// Only stores that hold the records locally can answer these.
#[async_trait]
pub trait ProvenanceIndex: Store {
    /// Products naming `producer_public_key` as their producer.
    async fn products_made_by(&self, producer_public_key: &str) -> Result<Vec<Product>>;

    /// Products listing `input_public_key` among their inputs.
    async fn products_using(&self, input_public_key: &str) -> Result<Vec<Product>>;
}

/// Extension trait for working with either kind of record.
#[async_trait]
pub trait StoreExt: Store {
    /// Insert a record of either kind.
    async fn insert(&self, record: &AnyRecord) -> Result<InsertResult> {
        match record {
            AnyRecord::Producer(p) => self.insert_producer(p).await,
            AnyRecord::Product(p) => self.insert_product(p).await,
        }
    }

    /// Get a record of the given kind.
    async fn get(&self, kind: RecordKind, public_key: &str) -> Result<Option<AnyRecord>> {
        Ok(match kind {
            RecordKind::Producer => self.get_producer(public_key).await?.map(AnyRecord::from),
            RecordKind::Product => self.get_product(public_key).await?.map(AnyRecord::from),
        })
    }
}

impl<S: Store + ?Sized> StoreExt for S {}
