//! carmart - a vehicle registry over a shared key-value cache.
//!
//! [`RecordStore`] maps number plates to [`Car`] records through a
//! [`cache::CacheHandle`]; [`seed::SeedLoader`] fills an empty namespace
//! with the initial catalog at startup.

pub mod bootstrap;
pub mod cache;
mod car;
pub mod codec;
pub mod config;
pub mod key;
pub mod lock;
pub mod seed;
mod store;
pub mod telemetry;

pub use car::{Car, CarType, Country};
pub use key::{KeyError, StoreKey};
pub use seed::{SeedLoader, SeedOutcome, SeedStrategy};
pub use store::{RecordStore, StoreError};
