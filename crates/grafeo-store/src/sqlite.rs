//! SQLite implementation of the Store trait.
//!
//! This is the local cache backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking. Records are kept as their
//! flat JSON projection, with the provenance edges broken out into their own
//! table so the graph can be queried without decoding every row.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;

use grafeo_core::{Producer, Product};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::{InsertResult, ProvenanceIndex, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file (and its parent directory) and runs migrations if it
    /// doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|e| {
                StoreError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                    Some(format!("mutex poisoned: {}", e)),
                ))
            })?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!("spawn_blocking failed: {}", e)),
            ))
        })?
    }
}

fn decode<T: DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| StoreError::InvalidData(format!("stored record: {}", e)))
}

/// Decode a row for reading. An undecodable row is logged and reads as absent.
fn decode_readable<T: DeserializeOwned>(json: &str) -> Option<T> {
    match decode(json) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(error = %e, "skipping undecodable row in sqlite store");
            None
        }
    }
}

/// Compare an incoming record against whatever is stored under its key.
fn existing_outcome<T: DeserializeOwned + PartialEq>(
    stored: Option<String>,
    record: &T,
) -> Result<Option<InsertResult>> {
    match stored {
        None => Ok(None),
        Some(json) => {
            let existing: T = decode(&json)?;
            Ok(Some(if &existing == record {
                InsertResult::AlreadyExists
            } else {
                InsertResult::Conflict
            }))
        }
    }
}

fn collect_records<T: DeserializeOwned>(
    conn: &Connection,
    sql: &str,
    key: &str,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![key], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows.iter().filter_map(|json| decode_readable(json)).collect())
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_producer(&self, producer: &Producer) -> Result<InsertResult> {
        let producer = producer.clone();
        let json = serde_json::to_string(&producer)?;

        self.run(move |conn| {
            let stored: Option<String> = conn
                .query_row(
                    "SELECT record FROM producers WHERE public_key = ?1",
                    params![producer.public_key],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(outcome) = existing_outcome(stored, &producer)? {
                return Ok(outcome);
            }

            conn.execute(
                "INSERT INTO producers (public_key, record, stored_at) VALUES (?1, ?2, ?3)",
                params![producer.public_key, json, now_millis()],
            )?;

            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn insert_product(&self, product: &Product) -> Result<InsertResult> {
        let product = product.clone();
        let json = serde_json::to_string(&product)?;

        self.run(move |conn| {
            let tx = conn.transaction()?;

            let stored: Option<String> = tx
                .query_row(
                    "SELECT record FROM products WHERE public_key = ?1",
                    params![product.public_key],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(outcome) = existing_outcome(stored, &product)? {
                return Ok(outcome);
            }

            tx.execute(
                "INSERT INTO products (public_key, producer_public_key, record, stored_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    product.public_key,
                    product.producer_public_key,
                    json,
                    now_millis()
                ],
            )?;

            for (position, input) in product.input_public_keys().enumerate() {
                tx.execute(
                    "INSERT INTO product_inputs (product_public_key, position, input_public_key)
                     VALUES (?1, ?2, ?3)",
                    params![product.public_key, position as i64, input],
                )?;
            }

            tx.commit()?;
            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn get_producer(&self, public_key: &str) -> Result<Option<Producer>> {
        let public_key = public_key.to_string();

        self.run(move |conn| {
            let stored: Option<String> = conn
                .query_row(
                    "SELECT record FROM producers WHERE public_key = ?1",
                    params![public_key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(stored.as_deref().and_then(decode_readable))
        })
        .await
    }

    async fn get_product(&self, public_key: &str) -> Result<Option<Product>> {
        let public_key = public_key.to_string();

        self.run(move |conn| {
            let stored: Option<String> = conn
                .query_row(
                    "SELECT record FROM products WHERE public_key = ?1",
                    params![public_key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(stored.as_deref().and_then(decode_readable))
        })
        .await
    }
}

#[async_trait]
impl ProvenanceIndex for SqliteStore {
    async fn products_made_by(&self, producer_public_key: &str) -> Result<Vec<Product>> {
        let key = producer_public_key.to_string();

        self.run(move |conn| {
            collect_records(
                conn,
                "SELECT record FROM products WHERE producer_public_key = ?1 ORDER BY public_key",
                &key,
            )
        })
        .await
    }

    async fn products_using(&self, input_public_key: &str) -> Result<Vec<Product>> {
        let key = input_public_key.to_string();

        self.run(move |conn| {
            collect_records(
                conn,
                "SELECT p.record FROM products p
                 WHERE p.public_key IN (
                     SELECT product_public_key FROM product_inputs WHERE input_public_key = ?1
                 )
                 ORDER BY p.public_key",
                &key,
            )
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;
    use grafeo_core::{new_producer, new_product, AnyRecord, ProtocolConfig, RecordKind};
    use tempfile::TempDir;

    const NONE: [&str; 0] = [];

    fn producer() -> (Producer, String) {
        new_producer(&ProtocolConfig::default(), "Acme").unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_producer() {
        let store = SqliteStore::open_memory().unwrap();
        let (producer, _) = producer();

        let result = store.insert_producer(&producer).await.unwrap();
        assert_eq!(result, InsertResult::Inserted);

        let retrieved = store.get_producer(&producer.public_key).await.unwrap();
        assert_eq!(retrieved, Some(producer.clone()));

        // Producers and products live in separate namespaces
        assert!(store.get_product(&producer.public_key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_idempotent_insert() {
        let store = SqliteStore::open_memory().unwrap();
        let (producer, _) = producer();

        assert_eq!(store.insert_producer(&producer).await.unwrap(), InsertResult::Inserted);
        assert_eq!(
            store.insert_producer(&producer).await.unwrap(),
            InsertResult::AlreadyExists
        );
    }

    #[tokio::test]
    async fn test_conflict_keeps_original() {
        let store = SqliteStore::open_memory().unwrap();
        let (producer, _) = producer();
        store.insert_producer(&producer).await.unwrap();

        let mut other = producer.clone();
        other.name = "Other".into();
        assert_eq!(store.insert_producer(&other).await.unwrap(), InsertResult::Conflict);

        let stored = store.get_producer(&producer.public_key).await.unwrap().unwrap();
        assert_eq!(stored.name, "Acme");
    }

    #[tokio::test]
    async fn test_product_with_inputs() {
        let config = ProtocolConfig::default();
        let store = SqliteStore::open_memory().unwrap();
        let (producer, producer_key) = producer();

        let (wheat, wheat_key) =
            new_product(&config, "Wheat", &producer.public_key, &producer_key, &NONE, &NONE)
                .unwrap();
        let (flour, _) = new_product(
            &config,
            "Flour",
            &producer.public_key,
            &producer_key,
            &[wheat.public_key.as_str()],
            &[wheat_key.as_str()],
        )
        .unwrap();

        store.insert(&AnyRecord::from(wheat.clone())).await.unwrap();
        store.insert(&AnyRecord::from(flour.clone())).await.unwrap();

        let fetched = store.get(RecordKind::Product, &flour.public_key).await.unwrap();
        assert_eq!(fetched, Some(AnyRecord::Product(flour.clone())));

        let made = store.products_made_by(&producer.public_key).await.unwrap();
        assert_eq!(made.len(), 2);
        assert!(made.windows(2).all(|w| w[0].public_key < w[1].public_key));

        assert_eq!(store.products_using(&wheat.public_key).await.unwrap(), vec![flour]);
        assert!(store.products_made_by(&wheat.public_key).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsigned_records_are_stored_as_given() {
        let store = SqliteStore::open_memory().unwrap();
        let (mut producer, _) = producer();
        producer.signature.clear();

        store.insert_producer(&producer).await.unwrap();
        let stored = store.get_producer(&producer.public_key).await.unwrap().unwrap();
        assert!(!stored.is_signed());
    }

    #[tokio::test]
    async fn test_persistence_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache").join("grafeo.db");
        let (producer, _) = producer();

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_producer(&producer).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let retrieved = store.get_producer(&producer.public_key).await.unwrap();
        assert_eq!(retrieved, Some(producer));
    }

    #[tokio::test]
    async fn test_corrupt_row_reads_as_missing() {
        let store = SqliteStore::open_memory().unwrap();
        let (producer, _) = producer();
        store
            .run(|conn| {
                conn.execute(
                    "INSERT INTO producers (public_key, record, stored_at) VALUES ('k', 'not json', 0)",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        assert!(store.get_producer("k").await.unwrap().is_none());

        // Writing over it cannot tell a duplicate from a conflict
        let mut planted = producer.clone();
        planted.public_key = "k".into();
        let err = store.insert_producer(&planted).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_corrupt_row_skipped_in_provenance_queries() {
        let config = ProtocolConfig::default();
        let store = SqliteStore::open_memory().unwrap();
        let (producer, producer_key) = producer();
        let (wheat, _) =
            new_product(&config, "Wheat", &producer.public_key, &producer_key, &NONE, &NONE)
                .unwrap();
        store.insert_product(&wheat).await.unwrap();

        let producer_key = producer.public_key.clone();
        store
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO products (public_key, producer_public_key, record, stored_at)
                     VALUES ('k', ?1, '{\"public_key\": 7}', 0)",
                    params![producer_key],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let made = store.products_made_by(&producer.public_key).await.unwrap();
        assert_eq!(made, vec![wheat]);
    }
}
