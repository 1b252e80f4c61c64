use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};

use carmart::cache::{CacheError, CacheHandle, InMemoryCache};

/// Wraps a cache and counts every write that reaches it.
#[derive(Clone)]
pub struct CountingCache {
    inner: InMemoryCache,
    writes: Arc<AtomicUsize>,
}

impl CountingCache {
    pub fn new(inner: InMemoryCache) -> Self {
        Self {
            inner,
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl CacheHandle for CountingCache {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, value)
    }

    fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, CacheError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.put_if_absent(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.inner.get(key)
    }

    fn remove(&self, key: &str) -> Result<bool, CacheError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key)
    }

    fn is_empty(&self) -> Result<bool, CacheError> {
        self.inner.is_empty()
    }

    fn len(&self) -> Result<usize, CacheError> {
        self.inner.len()
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.inner.keys()
    }
}

/// A cache whose server is gone: every operation fails.
pub struct UnreachableCache;

fn refused() -> CacheError {
    CacheError::unavailable("carcache", "connection refused")
}

impl CacheHandle for UnreachableCache {
    fn name(&self) -> &str {
        "carcache"
    }

    fn put(&self, _key: &str, _value: Vec<u8>) -> Result<(), CacheError> {
        Err(refused())
    }

    fn put_if_absent(&self, _key: &str, _value: Vec<u8>) -> Result<bool, CacheError> {
        Err(refused())
    }

    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Err(refused())
    }

    fn remove(&self, _key: &str) -> Result<bool, CacheError> {
        Err(refused())
    }

    fn is_empty(&self) -> Result<bool, CacheError> {
        Err(refused())
    }

    fn len(&self) -> Result<usize, CacheError> {
        Err(refused())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        Err(refused())
    }
}

/// Rejects writes to the listed keys and passes everything else through.
pub struct RejectingCache {
    inner: InMemoryCache,
    rejected: HashSet<String>,
}

impl RejectingCache {
    pub fn new(inner: InMemoryCache, rejected: &[&str]) -> Self {
        Self {
            inner,
            rejected: rejected.iter().map(|key| key.to_string()).collect(),
        }
    }

    fn check(&self, key: &str) -> Result<(), CacheError> {
        if self.rejected.contains(key) {
            return Err(CacheError::operation("carcache", "put", "value rejected"));
        }
        Ok(())
    }
}

impl CacheHandle for RejectingCache {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.check(key)?;
        self.inner.put(key, value)
    }

    fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, CacheError> {
        self.check(key)?;
        self.inner.put_if_absent(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.inner.get(key)
    }

    fn remove(&self, key: &str) -> Result<bool, CacheError> {
        self.inner.remove(key)
    }

    fn is_empty(&self) -> Result<bool, CacheError> {
        self.inner.is_empty()
    }

    fn len(&self) -> Result<usize, CacheError> {
        self.inner.len()
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.inner.keys()
    }
}

/// Makes every caller of `is_empty` wait until all of them have asked, so
/// concurrent seeders all observe the namespace before anyone writes.
pub struct RendezvousCache {
    inner: InMemoryCache,
    barrier: Arc<Barrier>,
    first_round: Mutex<usize>,
}

impl RendezvousCache {
    pub fn new(inner: InMemoryCache, parties: usize) -> Self {
        Self {
            inner,
            barrier: Arc::new(Barrier::new(parties)),
            first_round: Mutex::new(parties),
        }
    }
}

impl CacheHandle for RendezvousCache {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.inner.put(key, value)
    }

    fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, CacheError> {
        self.inner.put_if_absent(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.inner.get(key)
    }

    fn remove(&self, key: &str) -> Result<bool, CacheError> {
        self.inner.remove(key)
    }

    fn is_empty(&self) -> Result<bool, CacheError> {
        let empty = self.inner.is_empty()?;
        let wait = {
            let mut remaining = self.first_round.lock().map_err(|_| CacheError::Poisoned("is_empty"))?;
            if *remaining > 0 {
                *remaining -= 1;
                true
            } else {
                false
            }
        };
        if wait {
            self.barrier.wait();
        }
        Ok(empty)
    }

    fn len(&self) -> Result<usize, CacheError> {
        self.inner.len()
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.inner.keys()
    }
}
