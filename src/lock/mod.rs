//! Locks used to gate one-time startup work across callers.
//!
//! The seeder takes a named lock before re-checking and populating an empty
//! namespace. In one process an [`InMemoryLock`] is enough; hosts sharing a
//! Redis server use the Redis lock (feature `redis`), which expires after a
//! TTL so a crashed holder cannot block startup forever.

mod error;
mod in_memory;
mod lock;
mod lock_manager;
#[cfg(feature = "redis")]
mod redis;

pub use error::LockError;
pub use in_memory::{InMemoryLock, InMemoryLockManager};
pub use lock::Lock;
pub use lock_manager::LockManager;
#[cfg(feature = "redis")]
pub use self::redis::{RedisLock, RedisLockManager};
