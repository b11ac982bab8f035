//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use grafeo_core::{Producer, Product};

use crate::error::{Result, StoreError};
use crate::traits::{InsertResult, ProvenanceIndex, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Producers indexed by public key.
    producers: HashMap<String, Producer>,

    /// Products indexed by public key.
    products: HashMap<String, Product>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    /// Number of stored `(producers, products)`.
    pub fn len(&self) -> (usize, usize) {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        (inner.producers.len(), inner.products.len())
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == (0, 0)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: PoisonError<T>) -> StoreError {
    StoreError::InvalidData(format!("lock poisoned: {}", e))
}

fn insert_keyed<T: Clone + PartialEq>(
    map: &mut HashMap<String, T>,
    public_key: &str,
    record: &T,
) -> InsertResult {
    match map.get(public_key) {
        Some(existing) if existing == record => InsertResult::AlreadyExists,
        Some(_) => InsertResult::Conflict,
        None => {
            map.insert(public_key.to_string(), record.clone());
            InsertResult::Inserted
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_producer(&self, producer: &Producer) -> Result<InsertResult> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        Ok(insert_keyed(&mut inner.producers, &producer.public_key, producer))
    }

    async fn insert_product(&self, product: &Product) -> Result<InsertResult> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        Ok(insert_keyed(&mut inner.products, &product.public_key, product))
    }

    async fn get_producer(&self, public_key: &str) -> Result<Option<Producer>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.producers.get(public_key).cloned())
    }

    async fn get_product(&self, public_key: &str) -> Result<Option<Product>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.products.get(public_key).cloned())
    }
}

#[async_trait]
impl ProvenanceIndex for MemoryStore {
    async fn products_made_by(&self, producer_public_key: &str) -> Result<Vec<Product>> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut found: Vec<Product> = inner
            .products
            .values()
            .filter(|p| p.is_made_by(producer_public_key))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.public_key.cmp(&b.public_key));
        Ok(found)
    }

    async fn products_using(&self, input_public_key: &str) -> Result<Vec<Product>> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut found: Vec<Product> = inner
            .products
            .values()
            .filter(|p| p.has_input(input_public_key))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.public_key.cmp(&b.public_key));
        Ok(found)
    }
}
