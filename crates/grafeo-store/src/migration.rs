//! SQLite schema versioning.
//!
//! `MIGRATIONS[n]` takes the schema from version `n` to `n + 1`. Applied
//! versions are recorded in `schema_migrations`.

use rusqlite::{params, Connection};

use crate::error::{Result, StoreError};

/// Schema steps, oldest first.
const MIGRATIONS: &[&str] = &[
    // v1: records as flat JSON, input edges broken out for provenance queries
    r#"
    CREATE TABLE producers (
        public_key TEXT PRIMARY KEY,
        record TEXT NOT NULL,
        stored_at INTEGER NOT NULL
    );

    CREATE TABLE products (
        public_key TEXT PRIMARY KEY,
        producer_public_key TEXT NOT NULL,
        record TEXT NOT NULL,
        stored_at INTEGER NOT NULL
    );

    CREATE TABLE product_inputs (
        product_public_key TEXT NOT NULL REFERENCES products(public_key),
        position INTEGER NOT NULL,
        input_public_key TEXT NOT NULL,
        PRIMARY KEY (product_public_key, position)
    );

    CREATE INDEX idx_products_producer ON products(producer_public_key);
    CREATE INDEX idx_product_inputs_input ON product_inputs(input_public_key);
    "#,
];

/// Schema version this build writes.
pub const CURRENT_VERSION: u32 = MIGRATIONS.len() as u32;

/// Bring `conn` up to [`CURRENT_VERSION`]. Safe to call on every open.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
    )?;

    let found: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    if found > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "schema version {} is newer than {}",
            found, CURRENT_VERSION
        )));
    }

    let pending = &MIGRATIONS[found as usize..];
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in (found + 1..).zip(pending) {
        tx.execute_batch(sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            params![version, now_millis()],
        )?;
        tracing::debug!(version, "applied sqlite migration");
    }
    tx.commit()?;
    Ok(())
}

/// Wall-clock time in Unix milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_version(conn: &Connection) -> u32 {
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_fresh_database_gets_record_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();

        for table in ["producers", "products", "product_inputs"] {
            assert!(tables.iter().any(|t| t == table), "missing {}", table);
        }
        assert_eq!(schema_version(&conn), CURRENT_VERSION);
    }

    #[test]
    fn test_reopen_applies_nothing() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let applied: u32 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, CURRENT_VERSION);
    }

    #[test]
    fn test_newer_schema_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, 0)",
            params![CURRENT_VERSION + 1],
        )
        .unwrap();

        assert!(matches!(migrate(&mut conn), Err(StoreError::Migration(_))));
    }
}
