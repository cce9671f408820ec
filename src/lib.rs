//! # cachedhash
//!
//! Compute-or-cache helper keyed by normalized query parameters.
//!
//! A parameter sequence is turned into a deterministic SHA256 cache key,
//! a pluggable store is consulted, and on a miss the supplied computation
//! runs and its result is stored.
//!
//! ## Modules
//!
//! - [`key`] - Cache key derivation (normalization + hashing)
//! - [`facade`] - The compute-or-cache facade
//! - [`store`] - Store trait and bundled memory, LRU and SQLite stores
//! - [`cli`] - Command line interface
//! - [`types`] - Configuration and errors

#[cfg(all(feature = "cli", feature = "sqlite"))]
pub mod cli;
pub mod facade;
pub mod key;
pub mod store;
pub mod types;

pub use facade::{CachedHash, CachedHashBuilder};
pub use key::{cache_key, CacheParam};
pub use store::{CacheStore, LruStore, MemoryStore};
#[cfg(feature = "sqlite")]
pub use store::SqliteStore;
pub use types::config::Config;
pub use types::errors::{CachedHashError, CachedHashResult};
