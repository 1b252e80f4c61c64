//! Redis-backed cache namespaces.
//!
//! Each namespace is one Redis hash at `<prefix><namespace>`; fields are
//! store keys and values are encoded records. Every process pointing at the
//! same server and prefix shares the namespace.
//!
//! ```ignore
//! use carmart::cache::{CacheProvider, RedisCacheProvider};
//!
//! let provider = RedisCacheProvider::open("redis://127.0.0.1:6379", "carmart:")?;
//! let cars = provider.get_cache("carcache")?;
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ::redis::{Client, Connection, RedisError};

use super::{CacheError, CacheHandle, CacheProvider};

/// One namespace stored as a Redis hash.
///
/// Opens a connection from the shared client for each operation.
#[derive(Clone)]
pub struct RedisCache {
    client: Client,
    name: String,
    hash_key: String,
}

impl RedisCache {
    /// Create a handle for `namespace` on the server at `url`.
    pub fn open(url: &str, prefix: &str, namespace: &str) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(|e| {
            CacheError::unavailable(namespace, format!("invalid redis url: {e}"))
        })?;
        Ok(Self::with_client(client, prefix, namespace))
    }

    fn with_client(client: Client, prefix: &str, namespace: &str) -> Self {
        Self {
            client,
            name: namespace.to_string(),
            hash_key: format!("{prefix}{namespace}"),
        }
    }

    /// Redis key of the hash holding this namespace.
    pub fn hash_key(&self) -> &str {
        &self.hash_key
    }

    fn connection(&self) -> Result<Connection, CacheError> {
        self.client
            .get_connection()
            .map_err(|e| CacheError::unavailable(&self.name, e.to_string()))
    }

    fn failed(&self, operation: &'static str, err: RedisError) -> CacheError {
        if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
            CacheError::unavailable(&self.name, err.to_string())
        } else {
            CacheError::operation(&self.name, operation, err.to_string())
        }
    }
}

impl CacheHandle for RedisCache {
    fn name(&self) -> &str {
        &self.name
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        let mut conn = self.connection()?;
        ::redis::cmd("HSET")
            .arg(&self.hash_key)
            .arg(key)
            .arg(value)
            .query::<i64>(&mut conn)
            .map(|_| ())
            .map_err(|e| self.failed("HSET", e))
    }

    fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, CacheError> {
        let mut conn = self.connection()?;
        ::redis::cmd("HSETNX")
            .arg(&self.hash_key)
            .arg(key)
            .arg(value)
            .query::<i64>(&mut conn)
            .map(|written| written == 1)
            .map_err(|e| self.failed("HSETNX", e))
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.connection()?;
        ::redis::cmd("HGET")
            .arg(&self.hash_key)
            .arg(key)
            .query::<Option<Vec<u8>>>(&mut conn)
            .map_err(|e| self.failed("HGET", e))
    }

    fn remove(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection()?;
        ::redis::cmd("HDEL")
            .arg(&self.hash_key)
            .arg(key)
            .query::<i64>(&mut conn)
            .map(|removed| removed > 0)
            .map_err(|e| self.failed("HDEL", e))
    }

    fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }

    fn len(&self) -> Result<usize, CacheError> {
        let mut conn = self.connection()?;
        ::redis::cmd("HLEN")
            .arg(&self.hash_key)
            .query::<usize>(&mut conn)
            .map_err(|e| self.failed("HLEN", e))
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut conn = self.connection()?;
        ::redis::cmd("HKEYS")
            .arg(&self.hash_key)
            .query::<Vec<String>>(&mut conn)
            .map_err(|e| self.failed("HKEYS", e))
    }
}

/// Provider handing out [`RedisCache`] namespaces that share one client.
pub struct RedisCacheProvider {
    client: Client,
    prefix: String,
    caches: Mutex<HashMap<String, Arc<RedisCache>>>,
}

impl RedisCacheProvider {
    pub fn open(url: &str, prefix: impl Into<String>) -> Result<Self, CacheError> {
        let client = Client::open(url)
            .map_err(|e| CacheError::unavailable(url, format!("invalid redis url: {e}")))?;
        Ok(Self {
            client,
            prefix: prefix.into(),
            caches: Mutex::new(HashMap::new()),
        })
    }
}

impl CacheProvider for RedisCacheProvider {
    type Cache = RedisCache;

    fn get_cache(&self, name: &str) -> Result<Arc<RedisCache>, CacheError> {
        let mut caches = self
            .caches
            .lock()
            .map_err(|_| CacheError::Poisoned("get_cache"))?;
        Ok(caches
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(RedisCache::with_client(
                    self.client.clone(),
                    &self.prefix,
                    name,
                ))
            })
            .clone())
    }
}
