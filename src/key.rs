//! Deterministic cache key derivation.
//!
//! A parameter sequence is normalized into an accumulator of `_<fragment>`
//! pieces and hashed with SHA256. Each non-null parameter is lower-cased and
//! stripped of everything outside `a-z0-9`; a null parameter contributes the
//! literal fragment `null`.
//!
//! ```
//! use cachedhash::key::cache_key;
//!
//! let key = cache_key(&["abc1", "def2", "ghi3"]);
//! assert_eq!(key.len(), 64);
//! assert_eq!(key, cache_key(&["ABC1", "def-2", "ghi 3"]));
//! assert_eq!(cache_key::<&str>(&[]), "");
//! ```

use sha2::{Digest, Sha256};

/// Fragment used for a null parameter.
///
/// A non-null parameter that normalizes to `"null"` produces the same
/// fragment, so `[None]` and `["null"]` share a key.
pub const NULL_FRAGMENT: &str = "null";

/// Length of a non-empty key (hex-encoded SHA256).
pub const KEY_HEX_LEN: usize = 64;

/// A value usable as one cache key parameter.
///
/// `None` marks a null parameter.
pub trait CacheParam {
    /// Returns the parameter text, or `None` for a null parameter.
    fn as_param(&self) -> Option<&str>;
}

impl CacheParam for str {
    fn as_param(&self) -> Option<&str> {
        Some(self)
    }
}

impl CacheParam for String {
    fn as_param(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl<P: CacheParam + ?Sized> CacheParam for &P {
    fn as_param(&self) -> Option<&str> {
        (**self).as_param()
    }
}

impl<P: CacheParam> CacheParam for Option<P> {
    fn as_param(&self) -> Option<&str> {
        self.as_ref().and_then(CacheParam::as_param)
    }
}

/// Normalizes one non-null parameter: lower-case, then keep only `a-z0-9`.
pub fn normalize_param(param: &str) -> String {
    param
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Builds the pre-hash accumulator (`_<fragment>` per parameter).
///
/// Returns an empty string for an empty sequence.
pub fn key_material<P: CacheParam>(params: &[P]) -> String {
    let mut material = String::new();
    for param in params {
        material.push('_');
        match param.as_param() {
            Some(value) => material.push_str(&normalize_param(value)),
            None => material.push_str(NULL_FRAGMENT),
        }
    }
    material
}

/// Derives the cache key for a parameter sequence.
///
/// The key is the lowercase hex SHA256 of [`key_material`], or the empty
/// string when `params` is empty.
pub fn cache_key<P: CacheParam>(params: &[P]) -> String {
    if params.is_empty() {
        return String::new();
    }

    let mut hasher = Sha256::new();
    hasher.update(key_material(params).as_bytes());

    hex::encode(hasher.finalize())
}
