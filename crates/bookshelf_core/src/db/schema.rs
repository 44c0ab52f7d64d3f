//! `books` table creation, tracked by `PRAGMA user_version`.
//!
//! # Invariants
//! - A fresh database is created in one transaction; on failure the file
//!   keeps `user_version = 0` and no partial table set.
//! - A stored version above [`SCHEMA_VERSION`] is refused.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Creates the `books` table on a fresh database; no-op when current.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let found = stored_schema_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(DbError::NewerSchema {
            found,
            supported: SCHEMA_VERSION,
        });
    }
    if found == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)
        .map_err(DbError::SchemaCreation)?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;
    Ok(())
}

/// Reads `PRAGMA user_version`; `0` means no schema yet.
pub fn stored_schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
