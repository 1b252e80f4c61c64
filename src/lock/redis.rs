//! Redis-backed locks: `SET NX PX` to acquire, compare-and-delete to release.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use ::redis::{Client, Connection, Script};
use uuid::Uuid;

use super::{Lock, LockError, LockManager};

const RETRY_INTERVAL: Duration = Duration::from_millis(50);

const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

/// A lease on a Redis key.
///
/// The key holds a per-instance token so one holder can never release
/// another's lease. The lease expires after `ttl`.
pub struct RedisLock {
    client: Client,
    key: String,
    token: String,
    ttl: Duration,
    held: AtomicBool,
}

impl RedisLock {
    fn new(client: Client, key: String, ttl: Duration) -> Self {
        Self {
            client,
            key,
            token: Uuid::new_v4().to_string(),
            ttl,
            held: AtomicBool::new(false),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn connection(&self) -> Result<Connection, LockError> {
        self.client
            .get_connection()
            .map_err(|e| LockError::AcquireFailed(format!("{}: {e}", self.key)))
    }
}

impl Lock for RedisLock {
    fn lock(&self) -> Result<(), LockError> {
        while !self.try_lock()? {
            thread::sleep(RETRY_INTERVAL);
        }
        Ok(())
    }

    fn try_lock(&self) -> Result<bool, LockError> {
        let mut conn = self.connection()?;
        let ttl_ms = u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        let reply: Option<String> = ::redis::cmd("SET")
            .arg(&self.key)
            .arg(&self.token)
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query(&mut conn)
            .map_err(|e| LockError::AcquireFailed(format!("{}: {e}", self.key)))?;
        let acquired = reply.is_some();
        if acquired {
            self.held.store(true, Ordering::SeqCst);
        }
        Ok(acquired)
    }

    fn unlock(&self) -> Result<(), LockError> {
        if !self.held.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        let mut conn = self
            .client
            .get_connection()
            .map_err(|e| LockError::ReleaseFailed(format!("{}: {e}", self.key)))?;
        let deleted: i64 = Script::new(RELEASE_SCRIPT)
            .key(&self.key)
            .arg(&self.token)
            .invoke(&mut conn)
            .map_err(|e| LockError::ReleaseFailed(format!("{}: {e}", self.key)))?;
        if deleted == 0 {
            return Err(LockError::Expired(self.key.clone()));
        }
        Ok(())
    }
}

/// Lock manager handing out [`RedisLock`]s under a common key prefix.
pub struct RedisLockManager {
    client: Client,
    prefix: String,
    ttl: Duration,
    locks: Mutex<HashMap<String, Arc<RedisLock>>>,
}

impl RedisLockManager {
    pub fn open(url: &str, prefix: impl Into<String>, ttl: Duration) -> Result<Self, LockError> {
        let client = Client::open(url)
            .map_err(|e| LockError::AcquireFailed(format!("invalid redis url: {e}")))?;
        Ok(Self {
            client,
            prefix: prefix.into(),
            ttl,
            locks: Mutex::new(HashMap::new()),
        })
    }
}

impl LockManager for RedisLockManager {
    type Lock = RedisLock;

    fn get_lock(&self, name: &str) -> Result<Arc<RedisLock>, LockError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| LockError::Poisoned("lock manager map poisoned".into()))?;
        Ok(locks
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(RedisLock::new(
                    self.client.clone(),
                    format!("{}lock:{name}", self.prefix),
                    self.ttl,
                ))
            })
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_keys_live_under_prefix() {
        let manager =
            RedisLockManager::open("redis://127.0.0.1:6379", "carmart:", Duration::from_secs(30))
                .unwrap();
        let lock = manager.get_lock("carcache:seed").unwrap();
        assert_eq!(lock.key(), "carmart:lock:carcache:seed");
        assert!(Arc::ptr_eq(&lock, &manager.get_lock("carcache:seed").unwrap()));
    }
}
