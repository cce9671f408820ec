//! Unbounded in-memory store.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{poisoned, CacheStore};
use crate::CachedHashResult;

/// In-memory store backed by a `HashMap`.
///
/// Values are cloned out on `get`. Nothing is ever evicted.
#[derive(Debug)]
pub struct MemoryStore<T> {
    entries: RwLock<HashMap<String, T>>,
}

impl<T> MemoryStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> CachedHashResult<usize> {
        Ok(self.entries.read().map_err(poisoned)?.len())
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> CachedHashResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns `true` if an entry exists under `key`.
    pub fn contains_key(&self, key: &str) -> CachedHashResult<bool> {
        Ok(self.entries.read().map_err(poisoned)?.contains_key(key))
    }

    /// Removes every entry.
    pub fn clear(&self) -> CachedHashResult<()> {
        self.entries.write().map_err(poisoned)?.clear();
        Ok(())
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> CacheStore<T> for MemoryStore<T> {
    fn get(&self, key: &str) -> CachedHashResult<Option<T>> {
        Ok(self.entries.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: T) -> CachedHashResult<()> {
        self.entries
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> CachedHashResult<()> {
        self.entries.write().map_err(poisoned)?.remove(key);
        Ok(())
    }
}
