//! Capacity-bounded LRU store.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use lru::LruCache;

use super::{poisoned, CacheStore};
use crate::CachedHashResult;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(100) {
    Some(cap) => cap,
    None => unreachable!(),
};

/// Store statistics.
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    /// Current number of entries.
    pub size: usize,

    /// Maximum capacity.
    pub capacity: usize,

    /// Number of lookups that found an entry.
    pub hits: u64,

    /// Number of lookups that found nothing.
    pub misses: u64,
}

impl StoreStats {
    /// Calculates the hit rate.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU store.
///
/// Once `capacity` entries are held, inserting a new key evicts the least
/// recently used one. Eviction is this store's own policy; the facade knows
/// nothing about it.
pub struct LruStore<T> {
    cache: Mutex<LruCache<String, T>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T> LruStore<T> {
    /// Creates a new store.
    ///
    /// A `capacity` of 0 falls back to 100 entries.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
        Self {
            cache: Mutex::new(LruCache::new(cap)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns store statistics.
    pub fn stats(&self) -> CachedHashResult<StoreStats> {
        let cache = self.cache.lock().map_err(poisoned)?;
        Ok(StoreStats {
            size: cache.len(),
            capacity: cache.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        })
    }

    /// Removes every entry. Statistics are kept.
    pub fn clear(&self) -> CachedHashResult<()> {
        self.cache.lock().map_err(poisoned)?.clear();
        Ok(())
    }
}

impl<T> Default for LruStore<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY.get())
    }
}

impl<T: Clone + Send + Sync> CacheStore<T> for LruStore<T> {
    fn get(&self, key: &str) -> CachedHashResult<Option<T>> {
        // `get` (not `peek`) so a read refreshes recency
        let value = self.cache.lock().map_err(poisoned)?.get(key).cloned();

        let counter = if value.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);

        Ok(value)
    }

    fn set(&self, key: &str, value: T) -> CachedHashResult<()> {
        if let Some((evicted, _)) = self
            .cache
            .lock()
            .map_err(poisoned)?
            .push(key.to_string(), value)
        {
            if evicted != key {
                tracing::trace!(key = %evicted, "evicted least recently used entry");
            }
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> CachedHashResult<()> {
        self.cache.lock().map_err(poisoned)?.pop(key);
        Ok(())
    }
}
