//! Test fixtures and helpers.
//!
//! Common setup code for integration tests. Helpers panic on failure, since
//! a fixture that cannot be built is a broken test.

use grafeo_core::{KeyPair, Producer, Product, ProtocolConfig};
use grafeo_store::MemoryStore;

/// A signed record together with the key pair it was signed with.
#[derive(Debug, Clone)]
pub struct Signed<R> {
    pub record: R,
    pub key_pair: KeyPair,
}

impl<R> Signed<R> {
    /// The record's private key as hex.
    pub fn private_key(&self) -> String {
        self.key_pair.private_key()
    }
}

/// A test fixture with a protocol config and memory store.
pub struct TestFixture {
    pub config: ProtocolConfig,
    pub store: MemoryStore,
}

impl TestFixture {
    /// Create a new test fixture at the default protocol version.
    pub fn new() -> Self {
        Self::with_config(ProtocolConfig::default())
    }

    /// Create a fixture checking records against `config`.
    pub fn with_config(config: ProtocolConfig) -> Self {
        Self {
            config,
            store: MemoryStore::new(),
        }
    }

    /// Create a producer signed with a random key.
    pub fn make_producer(&self, name: &str) -> Signed<Producer> {
        self.make_producer_with(KeyPair::generate(), name)
    }

    /// Create a producer signed with the key derived from `seed`.
    pub fn make_seeded_producer(&self, seed: [u8; 32], name: &str) -> Signed<Producer> {
        self.make_producer_with(KeyPair::from_seed(&seed), name)
    }

    fn make_producer_with(&self, key_pair: KeyPair, name: &str) -> Signed<Producer> {
        let mut producer = Producer::new(&self.config, key_pair.public_key(), name);
        producer
            .sign(&key_pair.private_key())
            .expect("fixture producer must sign");
        Signed {
            record: producer,
            key_pair,
        }
    }

    /// Create a product made by `producer` from `inputs`, with a random key.
    pub fn make_product(
        &self,
        name: &str,
        producer: &Signed<Producer>,
        inputs: &[&Signed<Product>],
    ) -> Signed<Product> {
        self.make_product_with(KeyPair::generate(), name, producer, inputs)
    }

    /// Create a product with the key derived from `seed`.
    pub fn make_seeded_product(
        &self,
        seed: [u8; 32],
        name: &str,
        producer: &Signed<Producer>,
        inputs: &[&Signed<Product>],
    ) -> Signed<Product> {
        self.make_product_with(KeyPair::from_seed(&seed), name, producer, inputs)
    }

    fn make_product_with(
        &self,
        key_pair: KeyPair,
        name: &str,
        producer: &Signed<Producer>,
        inputs: &[&Signed<Product>],
    ) -> Signed<Product> {
        let input_public_keys = inputs.iter().map(|i| i.record.public_key.clone()).collect();
        let input_private_keys: Vec<String> = inputs.iter().map(|i| i.private_key()).collect();

        let mut product = Product::new(
            &self.config,
            key_pair.public_key(),
            name,
            producer.record.public_key.clone(),
            input_public_keys,
        );
        product
            .sign(
                &key_pair.private_key(),
                &producer.private_key(),
                &input_private_keys,
            )
            .expect("fixture product must sign");
        Signed {
            record: product,
            key_pair,
        }
    }

    /// A linear supply chain: one producer and `len` products, each made
    /// from the one before it.
    pub fn make_chain(&self, len: usize) -> (Signed<Producer>, Vec<Signed<Product>>) {
        let producer = self.make_producer("Chain Works");
        let mut products: Vec<Signed<Product>> = Vec::with_capacity(len);
        for i in 0..len {
            let name = format!("Stage {}", i);
            let product = match products.last() {
                Some(prev) => self.make_product(&name, &producer, &[prev]),
                None => self.make_product(&name, &producer, &[]),
            };
            products.push(product);
        }
        (producer, products)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple deterministic key pairs for multi-party tests.
pub fn multi_party_keys(count: usize) -> Vec<KeyPair> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[1] = (i >> 8) as u8;
            KeyPair::from_seed(&seed)
        })
        .collect()
}
