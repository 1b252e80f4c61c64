use std::sync::Arc;

use super::CacheError;

/// Trait for a single cache namespace.
///
/// Values are opaque bytes; keys are already-encoded store keys. Each
/// method is one round-trip against the backing cache with that cache's
/// own single-key atomicity. The in-memory handle uses an `RwLock`; a
/// distributed handle talks to Redis, a data grid, etc.
pub trait CacheHandle: Send + Sync {
    /// Name of the namespace this handle addresses.
    fn name(&self) -> &str;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;

    /// Store `value` only if `key` is absent.
    /// Returns `Ok(true)` if the value was written.
    fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, CacheError>;

    /// Read the value under `key`. Absence is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Delete `key`. Returns `Ok(true)` if it existed.
    fn remove(&self, key: &str) -> Result<bool, CacheError>;

    fn is_empty(&self) -> Result<bool, CacheError>;

    fn len(&self) -> Result<usize, CacheError>;

    /// All keys currently in the namespace, in no particular order.
    fn keys(&self) -> Result<Vec<String>, CacheError>;
}

impl<T: CacheHandle + ?Sized> CacheHandle for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        (**self).put(key, value)
    }

    fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, CacheError> {
        (**self).put_if_absent(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).get(key)
    }

    fn remove(&self, key: &str) -> Result<bool, CacheError> {
        (**self).remove(key)
    }

    fn is_empty(&self) -> Result<bool, CacheError> {
        (**self).is_empty()
    }

    fn len(&self) -> Result<usize, CacheError> {
        (**self).len()
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        (**self).keys()
    }
}
