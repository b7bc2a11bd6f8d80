//! Store schema versioning.
//!
//! # Invariants
//! - The applied schema version is mirrored to `PRAGMA user_version`.
//! - A database stamped newer than `STORE_SCHEMA_VERSION` is never touched.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Schema version written by this binary.
pub const STORE_SCHEMA_VERSION: u32 = 1;

const STORE_SCHEMA_SQL: &str = include_str!("kv_store.sql");

/// Creates the `kv_entries` table on a fresh database.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let current: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if current > STORE_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: STORE_SCHEMA_VERSION,
        });
    }
    if current == STORE_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(STORE_SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {STORE_SCHEMA_VERSION};"))?;
    tx.commit()?;

    info!(
        "event=schema_create module=db status=ok from_version={} to_version={}",
        current, STORE_SCHEMA_VERSION
    );
    Ok(())
}
