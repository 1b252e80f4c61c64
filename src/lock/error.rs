use thiserror::Error;

/// Error type for lock operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// A process-local primitive was poisoned (a thread panicked while holding it).
    #[error("lock poisoned: {0}")]
    Poisoned(String),
    /// The lock backend could not be reached or refused the acquisition.
    #[error("lock acquire failed: {0}")]
    AcquireFailed(String),
    /// The lock backend could not release the lock.
    #[error("lock release failed: {0}")]
    ReleaseFailed(String),
    /// The lease ran out before release and the lock may now belong to someone else.
    #[error("lock expired: {0}")]
    Expired(String),
}
