//! The Registry: the validated front door to a record store.
//!
//! Stores keep whatever they are handed. The Registry guarantees two things
//! on top of them:
//!
//! - nothing invalid is ever written (or POSTed) through it, and
//! - nothing invalid is ever handed back from it. A record that fails
//!   revalidation on the way out is reported as "not found".

use grafeo_core::{
    new_producer, new_product, AnyRecord, Producer, Product, ProtocolConfig, Record, RecordKind,
};
use grafeo_store::{InsertResult, ProvenanceIndex, Store};

use crate::error::{RegistryError, Result};

/// Configuration for the Registry.
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// The protocol version records are checked against.
    pub protocol: ProtocolConfig,
}

/// Result of posting a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostResult {
    /// The record was stored.
    Accepted,
    /// The identical record was already stored.
    Duplicate,
    /// A different record is stored under the same public key; the stored
    /// one was kept.
    Conflict,
}

impl From<InsertResult> for PostResult {
    fn from(result: InsertResult) -> Self {
        match result {
            InsertResult::Inserted => PostResult::Accepted,
            InsertResult::AlreadyExists => PostResult::Duplicate,
            InsertResult::Conflict => PostResult::Conflict,
        }
    }
}

/// The main Registry struct.
///
/// Provides a unified API for:
/// - Creating and signing producers and products
/// - Posting externally built records
/// - Looking records up by public key
/// - Following the provenance graph one hop at a time
pub struct Registry<S: Store> {
    /// The storage backend.
    store: S,
    /// Configuration.
    config: RegistryConfig,
}

impl<S: Store> Registry<S> {
    /// Create a new registry over `store`.
    pub fn new(store: S, config: RegistryConfig) -> Self {
        Self { store, config }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give back the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn admit<R: Record>(&self, record: &R) -> Result<()> {
        record.check(&self.config.protocol).map_err(|reason| {
            tracing::warn!(
                kind = %record.kind(),
                public_key = record.public_key(),
                %reason,
                "refusing to store invalid record"
            );
            RegistryError::Invalid {
                kind: record.kind(),
                reason,
            }
        })
    }

    fn screen<R: Record>(&self, record: Option<R>) -> Option<R> {
        let record = record?;
        match record.check(&self.config.protocol) {
            Ok(()) => Some(record),
            Err(reason) => {
                tracing::warn!(
                    kind = %record.kind(),
                    public_key = record.public_key(),
                    %reason,
                    "store returned an invalid record; treating as not found"
                );
                None
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Post Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Post an externally built producer.
    ///
    /// Fails with [`RegistryError::Invalid`] before touching the store if the
    /// producer is not valid.
    pub async fn post_producer(&self, producer: &Producer) -> Result<PostResult> {
        self.admit(producer)?;
        Ok(self.store.insert_producer(producer).await?.into())
    }

    /// Post an externally built product.
    ///
    /// Fails with [`RegistryError::Invalid`] before touching the store if the
    /// product is not valid.
    pub async fn post_product(&self, product: &Product) -> Result<PostResult> {
        self.admit(product)?;
        Ok(self.store.insert_product(product).await?.into())
    }

    /// Post a record of either kind.
    pub async fn post(&self, record: &AnyRecord) -> Result<PostResult> {
        match record {
            AnyRecord::Producer(p) => self.post_producer(p).await,
            AnyRecord::Product(p) => self.post_product(p).await,
        }
    }

    /// Store a freshly created record, where any collision is an error.
    async fn post_local(&self, record: AnyRecord) -> Result<()> {
        match self.post(&record).await? {
            PostResult::Accepted | PostResult::Duplicate => Ok(()),
            PostResult::Conflict => Err(RegistryError::Conflict {
                kind: record.kind(),
                public_key: record.public_key().to_string(),
            }),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Create Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create, sign and store a new producer.
    ///
    /// Returns the producer and its private key. The private key is never
    /// stored.
    pub async fn create_producer(&self, name: &str) -> Result<(Producer, String)> {
        let (producer, private_key) = new_producer(&self.config.protocol, name)?;
        self.post_local(AnyRecord::from(producer.clone())).await?;
        tracing::debug!(public_key = %producer.public_key, "created producer");
        Ok((producer, private_key))
    }

    /// Create, sign and store a new product made by `producer`.
    ///
    /// `inputs` pairs each input product with the private key its holder
    /// signs with. Returns the product and its private key.
    pub async fn create_product(
        &self,
        name: &str,
        producer: &Producer,
        producer_private_key: &str,
        inputs: &[(&Product, &str)],
    ) -> Result<(Product, String)> {
        let input_public_keys: Vec<&str> =
            inputs.iter().map(|(p, _)| p.public_key.as_str()).collect();
        let input_private_keys: Vec<&str> = inputs.iter().map(|(_, k)| *k).collect();

        let (product, private_key) = new_product(
            &self.config.protocol,
            name,
            &producer.public_key,
            producer_private_key,
            &input_public_keys,
            &input_private_keys,
        )?;
        self.post_local(AnyRecord::from(product.clone())).await?;
        tracing::debug!(
            public_key = %product.public_key,
            inputs = input_public_keys.len(),
            "created product"
        );
        Ok((product, private_key))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a valid producer by public key.
    pub async fn get_producer(&self, public_key: &str) -> Result<Option<Producer>> {
        let stored = self.store.get_producer(public_key).await?;
        Ok(self.screen(stored))
    }

    /// Get a valid product by public key.
    pub async fn get_product(&self, public_key: &str) -> Result<Option<Product>> {
        let stored = self.store.get_product(public_key).await?;
        Ok(self.screen(stored))
    }

    /// Get a valid record of the given kind.
    pub async fn get(&self, kind: RecordKind, public_key: &str) -> Result<Option<AnyRecord>> {
        Ok(match kind {
            RecordKind::Producer => self.get_producer(public_key).await?.map(AnyRecord::from),
            RecordKind::Product => self.get_product(public_key).await?.map(AnyRecord::from),
        })
    }

    /// The producer that made `product`, if it is stored and valid.
    pub async fn producer_of(&self, product: &Product) -> Result<Option<Producer>> {
        self.get_producer(&product.producer_public_key).await
    }

    /// The inputs of `product` in input order.
    ///
    /// Slots whose product is missing or invalid are `None`.
    pub async fn inputs_of(&self, product: &Product) -> Result<Vec<Option<Product>>> {
        let mut inputs = Vec::with_capacity(product.input_public_keys.len());
        for key in product.input_public_keys() {
            inputs.push(self.get_product(key).await?);
        }
        Ok(inputs)
    }
}

impl<S: ProvenanceIndex> Registry<S> {
    /// Valid products made by `producer_public_key`, ordered by public key.
    pub async fn products_made_by(&self, producer_public_key: &str) -> Result<Vec<Product>> {
        let found = self.store.products_made_by(producer_public_key).await?;
        Ok(found.into_iter().filter_map(|p| self.screen(Some(p))).collect())
    }

    /// Valid products that list `input_public_key` among their inputs,
    /// ordered by public key.
    pub async fn products_using(&self, input_public_key: &str) -> Result<Vec<Product>> {
        let found = self.store.products_using(input_public_key).await?;
        Ok(found.into_iter().filter_map(|p| self.screen(Some(p))).collect())
    }
}
