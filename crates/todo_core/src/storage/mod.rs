//! Opaque key-value persistence capability.
//!
//! # Responsibility
//! - Define the minimal durable string store the board persists into.
//! - Provide SQLite-backed and in-memory implementations.
//!
//! # Invariants
//! - `set` is synchronous: once it returns `Ok`, a later `get` on the same
//!   store observes the value.
//! - Keys are non-empty.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory_kv;
mod sqlite_kv;

pub use memory_kv::MemoryKeyValueStore;
pub use sqlite_kv::SqliteKeyValueStore;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure raised by a key-value store implementation.
#[derive(Debug)]
pub enum StorageError {
    /// Keys must contain at least one non-whitespace character.
    EmptyKey,
    Db(DbError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyKey => write!(f, "storage key cannot be empty"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyKey => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable string-to-string store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

fn ensure_key(key: &str) -> StorageResult<()> {
    if key.trim().is_empty() {
        return Err(StorageError::EmptyKey);
    }
    Ok(())
}
