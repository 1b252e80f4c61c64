use std::sync::Arc;

use super::{CacheError, CacheHandle};

/// Resolves cache handles by namespace name.
///
/// Replaces container or service-registry lookups: the host builds one
/// provider and passes the handles it returns to the components that
/// need them.
pub trait CacheProvider: Send + Sync {
    /// The concrete handle type returned by this provider.
    type Cache: CacheHandle;

    /// Get (or open) the cache for the given namespace.
    ///
    /// Repeated calls with the same `name` must address the same logical
    /// namespace (the same `Arc` in memory, the same remote key elsewhere).
    fn get_cache(&self, name: &str) -> Result<Arc<Self::Cache>, CacheError>;
}
