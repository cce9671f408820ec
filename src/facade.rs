//! Compute-or-cache facade.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use crate::key::{cache_key, CacheParam};
use crate::store::CacheStore;
use crate::{CachedHashError, CachedHashResult};

/// Looks values up in a shared store by normalized parameter key and
/// computes them on a miss.
///
/// The facade holds no state of its own besides the store reference, so it
/// is cheap to clone and many facades may share one store. There is no
/// single-flight: concurrent misses on the same key may each run the
/// computation and each write.
///
/// ```
/// use std::sync::Arc;
/// use cachedhash::{CachedHash, MemoryStore};
///
/// let store = Arc::new(MemoryStore::new());
/// let users = CachedHash::new(store);
///
/// let name = users.get_or_compute(&["1"], || "John".to_string()).unwrap();
/// assert_eq!(name, "John");
/// assert_eq!(users.peek(&["1"]).unwrap().as_deref(), Some("John"));
/// ```
pub struct CachedHash<T, S: ?Sized> {
    store: Arc<S>,
    label: Option<String>,
    _value: PhantomData<fn() -> T>,
}

impl<T, S: CacheStore<T> + ?Sized> CachedHash<T, S> {
    /// Creates a facade over a shared store.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            label: None,
            _value: PhantomData,
        }
    }

    /// Starts a builder.
    pub fn builder() -> CachedHashBuilder<T, S> {
        CachedHashBuilder::default()
    }

    /// The shared store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Label attached to log events, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Key this facade uses for `params`.
    pub fn key<P: CacheParam>(&self, params: &[P]) -> String {
        cache_key(params)
    }

    /// Returns the cached value for `params`, or runs `compute`, stores its
    /// result and returns it.
    ///
    /// On a miss exactly one store write happens before returning.
    pub fn get_or_compute<P, F>(&self, params: &[P], compute: F) -> CachedHashResult<T>
    where
        T: Clone,
        P: CacheParam,
        F: FnOnce() -> T,
    {
        self.try_get_or_compute(params, || Ok::<_, CachedHashError>(compute()))
    }

    /// Like [`get_or_compute`](Self::get_or_compute) with a fallible
    /// computation.
    ///
    /// A computation error is returned unchanged and nothing is stored.
    /// Store errors are converted into `E`.
    pub fn try_get_or_compute<P, F, E>(&self, params: &[P], compute: F) -> Result<T, E>
    where
        T: Clone,
        P: CacheParam,
        F: FnOnce() -> Result<T, E>,
        E: From<CachedHashError>,
    {
        let key = cache_key(params);

        if let Some(value) = self.store.get(&key)? {
            debug!(label = self.label(), key = %key, "cache hit");
            return Ok(value);
        }

        debug!(label = self.label(), key = %key, "cache miss, computing");
        let value = compute()?;
        self.store.set(&key, value.clone())?;
        debug!(label = self.label(), key = %key, "cached computed value");

        Ok(value)
    }

    /// Removes the entry for `params`. A missing entry is not an error.
    pub fn remove<P: CacheParam>(&self, params: &[P]) -> CachedHashResult<()> {
        let key = cache_key(params);
        debug!(label = self.label(), key = %key, "removing cache entry");
        self.store.remove(&key)
    }

    /// Returns what the store holds for `params` without computing anything.
    pub fn peek<P: CacheParam>(&self, params: &[P]) -> CachedHashResult<Option<T>> {
        self.store.get(&cache_key(params))
    }
}

impl<T, S: ?Sized> Clone for CachedHash<T, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            label: self.label.clone(),
            _value: PhantomData,
        }
    }
}

impl<T, S: ?Sized> fmt::Debug for CachedHash<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedHash")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CachedHash`].
///
/// [`build`](Self::build) fails with [`CachedHashError::MissingStore`] when
/// no store was supplied.
pub struct CachedHashBuilder<T, S: ?Sized> {
    store: Option<Arc<S>>,
    label: Option<String>,
    _value: PhantomData<fn() -> T>,
}

impl<T, S: ?Sized> Default for CachedHashBuilder<T, S> {
    fn default() -> Self {
        Self {
            store: None,
            label: None,
            _value: PhantomData,
        }
    }
}

impl<T, S: CacheStore<T> + ?Sized> CachedHashBuilder<T, S> {
    /// Sets the shared store.
    pub fn store(mut self, store: Arc<S>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets an optional store, as read from configuration.
    pub fn maybe_store(mut self, store: Option<Arc<S>>) -> Self {
        self.store = store;
        self
    }

    /// Sets the label attached to log events.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builds the facade.
    pub fn build(self) -> CachedHashResult<CachedHash<T, S>> {
        let store = self.store.ok_or(CachedHashError::MissingStore)?;
        Ok(CachedHash {
            store,
            label: self.label,
            _value: PhantomData,
        })
    }
}
