use std::sync::Arc;

use super::{Lock, LockError};

/// Factory trait for obtaining named locks.
pub trait LockManager: Send + Sync {
    /// The concrete lock type returned by this manager.
    type Lock: Lock;

    /// Get (or create) the lock with the given name.
    ///
    /// Repeated calls with the same `name` must return the same logical lock.
    fn get_lock(&self, name: &str) -> Result<Arc<Self::Lock>, LockError>;
}
