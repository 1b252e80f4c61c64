//! Cache handles - the shared key-value namespace records live in.
//!
//! A [`CacheHandle`] is one flat namespace of byte values keyed by string.
//! A [`CacheProvider`] resolves handles by namespace name, so that every
//! component asking for `"carcache"` talks to the same logical namespace.
//!
//! ## Example
//!
//! ```ignore
//! use carmart::cache::{CacheProvider, InMemoryCacheProvider};
//!
//! let provider = InMemoryCacheProvider::new();
//! let cars = provider.get_cache("carcache")?;
//! cars.put("FML+23-25", bytes)?;
//! ```

mod error;
mod handle;
mod in_memory;
mod provider;
#[cfg(feature = "redis")]
mod redis;

pub use error::CacheError;
pub use handle::CacheHandle;
pub use in_memory::{InMemoryCache, InMemoryCacheProvider};
pub use provider::CacheProvider;
#[cfg(feature = "redis")]
pub use self::redis::{RedisCache, RedisCacheProvider};

/// Namespace name used by the car registry.
pub const CACHE_NAME: &str = "carcache";
