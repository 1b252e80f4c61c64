use super::LockError;

/// Trait for a single named lock.
///
/// Implementations provide blocking lock, non-blocking try-lock, and unlock.
/// Object-safe so callers can hold an `Arc<dyn Lock>` chosen at startup.
pub trait Lock: Send + Sync {
    /// Acquire the lock, blocking until it becomes available.
    fn lock(&self) -> Result<(), LockError>;

    /// Try to acquire the lock without blocking.
    /// Returns `Ok(true)` if acquired, `Ok(false)` if already held.
    fn try_lock(&self) -> Result<bool, LockError>;

    /// Release the lock. Releasing a lock that is not held is a no-op.
    fn unlock(&self) -> Result<(), LockError>;
}
