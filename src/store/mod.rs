//! RecordStore - CRUD over the shared car namespace.
//!
//! Callers deal in plates and [`Car`] values only; key encoding and the
//! value codec live here.
//!
//! ## Example
//!
//! ```ignore
//! use carmart::{Car, CarType, Country, RecordStore};
//! use carmart::cache::InMemoryCache;
//!
//! let store = RecordStore::new(InMemoryCache::new("carcache"));
//! store.add(&Car::new("VW Golf", 1.6, CarType::Hatchback, "yellow", "2B2 4946", Country::Germany))?;
//! let golf = store.get("2B2 4946")?;
//! store.remove("2B2 4946")?;
//! ```

mod error;

use tracing::{debug, info};

use crate::cache::CacheHandle;
use crate::codec::ValueFormat;
use crate::key::StoreKey;
use crate::Car;

pub use error::StoreError;

/// CRUD façade over one cache namespace.
///
/// Holds no state besides the handle; every call goes straight to the
/// cache. Writes are last-write-wins.
#[derive(Clone)]
pub struct RecordStore<C> {
    cache: C,
    format: ValueFormat,
}

impl<C: CacheHandle> RecordStore<C> {
    /// Create a store writing JSON values.
    pub fn new(cache: C) -> Self {
        Self::with_format(cache, ValueFormat::default())
    }

    pub fn with_format(cache: C, format: ValueFormat) -> Self {
        Self { cache, format }
    }

    pub fn namespace(&self) -> &str {
        self.cache.name()
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn format(&self) -> ValueFormat {
        self.format
    }

    /// Store `car` under its plate, replacing any existing record.
    /// Returns the key it was written under.
    pub fn add(&self, car: &Car) -> Result<StoreKey, StoreError> {
        let key = StoreKey::from_plate(car.number_plate())?;
        validate(car)?;
        let bytes = self.encode(&key, car)?;
        self.cache.put(key.as_str(), bytes)?;
        debug!(
            target = "carmart::store",
            namespace = %self.namespace(),
            plate = %car.number_plate(),
            "stored car"
        );
        Ok(key)
    }

    /// Store `car` only if no record exists under its plate.
    /// Returns `Ok(true)` if it was written.
    pub fn add_if_absent(&self, car: &Car) -> Result<bool, StoreError> {
        let key = StoreKey::from_plate(car.number_plate())?;
        validate(car)?;
        let bytes = self.encode(&key, car)?;
        Ok(self.cache.put_if_absent(key.as_str(), bytes)?)
    }

    /// Look up a car by plate. Returns `Ok(None)` if there is none.
    pub fn get(&self, plate: &str) -> Result<Option<Car>, StoreError> {
        let key = StoreKey::from_plate(plate)?;
        self.load(&key)
    }

    /// Delete the car with this plate. Deleting an absent plate is a no-op.
    pub fn remove(&self, plate: &str) -> Result<(), StoreError> {
        info!(target = "carmart::store", plate = %plate, "deleting car");
        let key = StoreKey::from_plate(plate)?;
        let existed = self.cache.remove(key.as_str())?;
        if !existed {
            debug!(target = "carmart::store", plate = %plate, "no car to delete");
        }
        Ok(())
    }

    /// Plates of every stored car, in the cache's iteration order.
    pub fn list_plates(&self) -> Result<Vec<String>, StoreError> {
        self.cache
            .keys()?
            .into_iter()
            .map(|raw| -> Result<String, StoreError> { Ok(StoreKey::parse(raw)?.plate()?) })
            .collect()
    }

    /// Every stored car, in the cache's iteration order.
    ///
    /// Entries removed between listing keys and reading them are skipped.
    pub fn list(&self) -> Result<Vec<Car>, StoreError> {
        let mut cars = Vec::new();
        for raw in self.cache.keys()? {
            let key = StoreKey::parse(raw)?;
            if let Some(car) = self.load(&key)? {
                cars.push(car);
            }
        }
        Ok(cars)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.cache.is_empty()?)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.cache.len()?)
    }

    fn load(&self, key: &StoreKey) -> Result<Option<Car>, StoreError> {
        match self.cache.get(key.as_str())? {
            Some(bytes) => self
                .format
                .decode(&bytes)
                .map(Some)
                .map_err(|source| StoreError::Codec {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn encode(&self, key: &StoreKey, car: &Car) -> Result<Vec<u8>, StoreError> {
        self.format.encode(car).map_err(|source| StoreError::Codec {
            key: key.to_string(),
            source,
        })
    }
}

/// JSON has no NaN or infinity, so such a displacement would be written as
/// `null` and fail every later read.
fn validate(car: &Car) -> Result<(), StoreError> {
    if !car.displacement.is_finite() {
        return Err(StoreError::InvalidRecord {
            plate: car.number_plate().to_string(),
            reason: format!("displacement must be finite, got {}", car.displacement),
        });
    }
    Ok(())
}
