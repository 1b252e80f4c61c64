use thiserror::Error;

/// Error type for cache operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The backing cache could not be reached or the handle could not be obtained.
    #[error("cache `{namespace}` unavailable: {reason}")]
    Unavailable { namespace: String, reason: String },
    /// The cache was reachable but rejected or failed the operation.
    #[error("cache operation {operation} failed on `{namespace}`: {reason}")]
    Operation {
        namespace: String,
        operation: &'static str,
        reason: String,
    },
    /// A process-local lock guarding the cache was poisoned.
    #[error("cache lock poisoned during {0}")]
    Poisoned(&'static str),
}

impl CacheError {
    pub fn unavailable(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            namespace: namespace.into(),
            reason: reason.into(),
        }
    }

    pub fn operation(
        namespace: impl Into<String>,
        operation: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Operation {
            namespace: namespace.into(),
            operation,
            reason: reason.into(),
        }
    }
}
