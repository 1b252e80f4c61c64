//! Startup wiring: settings → cache handle → record store → seeding.
//!
//! ```ignore
//! let settings = carmart::config::Settings::load()?;
//! carmart::telemetry::init(&settings.logging)?;
//! let store = carmart::bootstrap::start(&settings)?;
//! ```

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::cache::{CacheError, CacheHandle, CacheProvider, InMemoryCacheProvider};
use crate::config::{CacheBackend, Settings};
use crate::lock::{InMemoryLockManager, LockError, LockManager};
use crate::seed::{SeedLoader, SeedOutcome, SeedStrategy};
use crate::RecordStore;

/// A record store over whichever backend the settings selected.
pub type SharedStore = RecordStore<Arc<dyn CacheHandle>>;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("cache backend `{0}` is not compiled in; enable the `{0}` feature")]
    BackendDisabled(&'static str),
    #[error("cache.redis_url is required for the redis backend")]
    MissingRedisUrl,
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Open the configured cache, seed it, and return the store.
///
/// Only failing to obtain the cache or its lock manager is fatal. Seeding
/// problems are logged and the store is returned regardless.
pub fn start(settings: &Settings) -> Result<SharedStore, BootstrapError> {
    let cache = open_cache(settings)?;
    let (store, _) = match settings.cache.backend {
        CacheBackend::Memory => start_with_cache(settings, cache, &InMemoryLockManager::new()),
        CacheBackend::Redis => start_redis(settings, cache)?,
    };
    Ok(store)
}

/// Seed an already-obtained cache and return the store with the seed outcome.
///
/// With [`SeedStrategy::Locked`] the gate is the lock named
/// `"<namespace>:seed"` from `locks`; hosts sharing a cache must share the
/// manager for the gate to exclude anything.
pub fn start_with_cache<M>(
    settings: &Settings,
    cache: Arc<dyn CacheHandle>,
    locks: &M,
) -> (SharedStore, SeedOutcome)
where
    M: LockManager,
    M::Lock: 'static,
{
    let store = RecordStore::with_format(cache, settings.cache.value_format);

    let mut loader = SeedLoader::new(&store).with_strategy(settings.seed.strategy);
    if settings.seed.strategy == SeedStrategy::Locked {
        match locks.get_lock(&seed_lock_name(settings)) {
            Ok(gate) => loader = loader.with_gate(gate),
            Err(err) => warn!(
                target = "carmart::bootstrap",
                error = %err,
                "seed lock unavailable, seeding without it"
            ),
        }
    }
    let outcome = loader.run();
    drop(loader);

    info!(
        target = "carmart::bootstrap",
        namespace = %store.namespace(),
        outcome = ?outcome,
        "car registry ready"
    );
    (store, outcome)
}

/// Name of the lock gating the seeder of `settings.cache.namespace`.
pub fn seed_lock_name(settings: &Settings) -> String {
    format!("{}:seed", settings.cache.namespace)
}

/// Obtain the cache handle named by `settings.cache.namespace`.
pub fn open_cache(settings: &Settings) -> Result<Arc<dyn CacheHandle>, BootstrapError> {
    match settings.cache.backend {
        CacheBackend::Memory => {
            let cache: Arc<dyn CacheHandle> =
                InMemoryCacheProvider::new().get_cache(&settings.cache.namespace)?;
            Ok(cache)
        }
        CacheBackend::Redis => open_redis(settings),
    }
}

#[cfg(feature = "redis")]
fn open_redis(settings: &Settings) -> Result<Arc<dyn CacheHandle>, BootstrapError> {
    use crate::cache::RedisCacheProvider;

    let url = redis_url(settings)?;
    let provider = RedisCacheProvider::open(url, settings.cache.key_prefix.as_str())?;
    let cache: Arc<dyn CacheHandle> = provider.get_cache(&settings.cache.namespace)?;
    Ok(cache)
}

#[cfg(not(feature = "redis"))]
fn open_redis(_settings: &Settings) -> Result<Arc<dyn CacheHandle>, BootstrapError> {
    Err(BootstrapError::BackendDisabled("redis"))
}

#[cfg(feature = "redis")]
fn redis_url(settings: &Settings) -> Result<&str, BootstrapError> {
    settings
        .cache
        .redis_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .ok_or(BootstrapError::MissingRedisUrl)
}

#[cfg(feature = "redis")]
fn start_redis(
    settings: &Settings,
    cache: Arc<dyn CacheHandle>,
) -> Result<(SharedStore, SeedOutcome), BootstrapError> {
    use crate::lock::RedisLockManager;

    let locks = RedisLockManager::open(
        redis_url(settings)?,
        settings.cache.key_prefix.as_str(),
        settings.seed.lock_ttl(),
    )?;
    Ok(start_with_cache(settings, cache, &locks))
}

#[cfg(not(feature = "redis"))]
fn start_redis(
    _settings: &Settings,
    _cache: Arc<dyn CacheHandle>,
) -> Result<(SharedStore, SeedOutcome), BootstrapError> {
    Err(BootstrapError::BackendDisabled("redis"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::codec::ValueFormat;
    use crate::seed::catalog;
    use std::time::Duration;

    #[test]
    fn start_seeds_memory_backend() {
        let store = start(&Settings::default()).unwrap();
        assert_eq!(store.namespace(), "carcache");
        assert_eq!(store.len().unwrap(), catalog().len());
    }

    #[test]
    fn start_with_cache_respects_format_and_strategy() {
        let mut settings = Settings::default();
        settings.cache.value_format = ValueFormat::Bitcode;
        settings.seed.strategy = SeedStrategy::Locked;

        let cache = InMemoryCache::new("carcache");
        let locks = InMemoryLockManager::new();
        let (store, outcome) = start_with_cache(&settings, Arc::new(cache.clone()), &locks);
        assert_eq!(outcome, SeedOutcome::Seeded { inserted: 5, failed: 0 });
        assert_eq!(store.format(), ValueFormat::Bitcode);

        let (_, again) = start_with_cache(&settings, Arc::new(cache), &locks);
        assert_eq!(again, SeedOutcome::AlreadyPresent);
    }

    #[test]
    fn locked_start_waits_for_the_shared_seed_lock() {
        use crate::lock::Lock;

        let mut settings = Settings::default();
        settings.seed.strategy = SeedStrategy::Locked;
        let locks = InMemoryLockManager::new();
        let cache = InMemoryCache::new("carcache");

        // Another host holds the seed lock and is mid-seed.
        let held = locks.get_lock(&seed_lock_name(&settings)).unwrap();
        held.lock().unwrap();

        std::thread::scope(|scope| {
            let worker =
                scope.spawn(|| start_with_cache(&settings, Arc::new(cache.clone()), &locks).1);
            std::thread::sleep(Duration::from_millis(50));
            assert!(!worker.is_finished());

            RecordStore::new(cache.clone()).add(&catalog()[0]).unwrap();
            held.unlock().unwrap();
            assert_eq!(worker.join().unwrap(), SeedOutcome::AlreadyPresent);
        });
        assert_eq!(RecordStore::new(cache).len().unwrap(), 1);
    }

    #[cfg(not(feature = "redis"))]
    #[test]
    fn redis_backend_needs_feature() {
        let mut settings = Settings::default();
        settings.cache.backend = CacheBackend::Redis;
        settings.cache.redis_url = Some("redis://127.0.0.1:6379".into());
        assert!(matches!(
            start(&settings),
            Err(BootstrapError::BackendDisabled("redis"))
        ));
    }
}
