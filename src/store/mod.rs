//! Key-value stores behind the cache facade.
//!
//! The facade only talks to [`CacheStore`]. Three implementations ship
//! with the crate:
//!
//! - [`MemoryStore`]: unbounded `HashMap` behind a `RwLock`
//! - [`LruStore`]: capacity-bounded LRU with hit/miss statistics
//! - [`SqliteStore`]: persistent JSON-encoded entries (feature `sqlite`)
//!
//! Stores take `&self` everywhere so one instance can be shared by many
//! facades through an `Arc`.

mod lru;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use self::lru::{LruStore, StoreStats};
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteStore, StoredEntry};

use std::sync::Arc;

use crate::CachedHashResult;

/// Storage collaborator used by [`CachedHash`](crate::CachedHash).
///
/// `get` must accept any key, including the empty string, and report a
/// missing entry as `Ok(None)`. `set` overwrites. `remove` is a no-op for a
/// missing key.
pub trait CacheStore<T>: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> CachedHashResult<Option<T>>;

    /// Stores `value` under `key`, replacing any previous entry.
    fn set(&self, key: &str, value: T) -> CachedHashResult<()>;

    /// Deletes the entry under `key`.
    fn remove(&self, key: &str) -> CachedHashResult<()>;
}

impl<T, S: CacheStore<T> + ?Sized> CacheStore<T> for Arc<S> {
    fn get(&self, key: &str) -> CachedHashResult<Option<T>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: T) -> CachedHashResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> CachedHashResult<()> {
        (**self).remove(key)
    }
}

impl<T, S: CacheStore<T> + ?Sized> CacheStore<T> for Box<S> {
    fn get(&self, key: &str) -> CachedHashResult<Option<T>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: T) -> CachedHashResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> CachedHashResult<()> {
        (**self).remove(key)
    }
}

/// Maps a poisoned lock to a store error.
pub(crate) fn poisoned<E>(_: E) -> crate::CachedHashError {
    crate::CachedHashError::store("lock poisoned")
}
