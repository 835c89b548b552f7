//! SQLite-backed key-value storage over the `kv_entries` table.
//!
//! # Invariants
//! - Connections must be migrated (`db::open_db*`) before use.
//! - `set` is a single upsert statement; readers never see partial values.

use super::{KeyValueStore, StorageError, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::borrow::Borrow;

/// Key-value store over a migrated SQLite connection.
///
/// `C` is either `&Connection`, so several containers share one handle, or
/// an owned `Connection` for a store that lives as long as the session.
pub struct SqliteKeyValueStore<C: Borrow<Connection>> {
    conn: C,
}

impl<C: Borrow<Connection>> SqliteKeyValueStore<C> {
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    fn conn(&self) -> &Connection {
        self.conn.borrow()
    }
}

impl<C: Borrow<Connection>> KeyValueStore for SqliteKeyValueStore<C> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.conn()
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|err| StorageError::backend(key, err))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn()
            .execute(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )
            .map_err(|err| StorageError::backend(key, err))?;
        Ok(())
    }
}
