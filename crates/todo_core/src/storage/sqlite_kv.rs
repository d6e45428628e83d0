//! SQLite-backed key-value store over the `kv_entries` table.

use super::{ensure_key, KeyValueStore, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Key-value store persisting into a migrated SQLite connection.
///
/// The connection must come from `db::open_db` / `db::open_db_in_memory` so
/// that the `kv_entries` table exists.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Borrows the underlying connection for diagnostics.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        ensure_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        ensure_key(key)?;
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        ensure_key(key)?;
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}
