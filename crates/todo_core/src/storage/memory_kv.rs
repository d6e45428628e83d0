//! Process-local key-value store used by tests and ephemeral boards.

use super::{ensure_key, KeyValueStore, StorageResult};
use std::collections::HashMap;

/// `HashMap`-backed store. Contents vanish with the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with one raw entry, bypassing write accounting.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Number of successful `set` calls since creation.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        ensure_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        ensure_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        ensure_key(key)?;
        self.entries.remove(key);
        Ok(())
    }
}
