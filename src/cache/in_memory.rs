//! InMemoryCache - HashMap-backed cache namespace for tests and single-process hosts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use super::{CacheError, CacheHandle, CacheProvider};

/// In-memory cache namespace backed by a `HashMap`.
///
/// Clone-friendly via `Arc`: clones share the same entries, which is how
/// several components (or threads) see one namespace.
#[derive(Clone)]
pub struct InMemoryCache {
    name: Arc<str>,
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryCache {
    /// Create a new empty namespace.
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            name: name.into(),
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn read(
        &self,
        operation: &'static str,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Vec<u8>>>, CacheError> {
        self.entries
            .read()
            .map_err(|_| CacheError::Poisoned(operation))
    }

    fn write(
        &self,
        operation: &'static str,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Vec<u8>>>, CacheError> {
        self.entries
            .write()
            .map_err(|_| CacheError::Poisoned(operation))
    }
}

impl CacheHandle for InMemoryCache {
    fn name(&self) -> &str {
        &self.name
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.write("put")?.insert(key.to_string(), value);
        Ok(())
    }

    fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, CacheError> {
        let mut entries = self.write("put_if_absent")?;
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value);
        Ok(true)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.read("get")?.get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.write("remove")?.remove(key).is_some())
    }

    fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.read("is_empty")?.is_empty())
    }

    fn len(&self) -> Result<usize, CacheError> {
        Ok(self.read("len")?.len())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.read("keys")?.keys().cloned().collect())
    }
}

/// In-memory cache provider backed by a `HashMap<String, Arc<InMemoryCache>>`.
///
/// Lazily creates one namespace per unique name and returns the same `Arc`
/// for repeated lookups.
#[derive(Default)]
pub struct InMemoryCacheProvider {
    caches: Mutex<HashMap<String, Arc<InMemoryCache>>>,
}

impl InMemoryCacheProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheProvider for InMemoryCacheProvider {
    type Cache = InMemoryCache;

    fn get_cache(&self, name: &str) -> Result<Arc<InMemoryCache>, CacheError> {
        let mut caches = self
            .caches
            .lock()
            .map_err(|_| CacheError::Poisoned("get_cache"))?;
        Ok(caches
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InMemoryCache::new(name)))
            .clone())
    }
}
