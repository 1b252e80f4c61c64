//! SeedLoader - one-time population of an empty namespace at startup.
//!
//! ```ignore
//! let store = RecordStore::new(cache);
//! SeedLoader::new(&store).run();
//! ```
//!
//! Seeding never fails the host: every error is logged and startup goes on.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::cache::CacheHandle;
use crate::lock::Lock;
use crate::{Car, CarType, Country, RecordStore};

/// How concurrent seeders are kept from stepping on each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedStrategy {
    /// Check for emptiness, then overwrite each catalog record. Two hosts
    /// starting against the same empty namespace may both seed; the writes
    /// are identical so the result is the same.
    #[default]
    CheckThenSeed,
    /// Check for emptiness, then insert each record only if absent.
    PutIfAbsent,
    /// Hold a named lock around the check and the inserts.
    Locked,
}

/// What a seeding run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The namespace was empty. `inserted` counts records this run wrote.
    Seeded { inserted: usize, failed: usize },
    /// The namespace already held data; nothing was written.
    AlreadyPresent,
    /// Seeding could not start (cache or lock failure); nothing was written.
    Skipped,
}

/// The fixed initial catalog, in insertion order.
pub fn catalog() -> Vec<Car> {
    vec![
        Car::new("Ford Focus", 1.6, CarType::Combi, "white", "FML 23-25", Country::CzechRepublic),
        Car::new("BMW X3", 2.0, CarType::Sedan, "gray", "1P3 2632", Country::CzechRepublic),
        Car::new("Ford Mondeo", 2.2, CarType::Combi, "blue", "1B2 1111", Country::Usa),
        Car::new("Mazda MX-5", 1.8, CarType::Cabrio, "red", "6T4 2526", Country::Usa),
        Car::new("VW Golf", 1.6, CarType::Hatchback, "yellow", "2B2 4946", Country::Germany),
    ]
}

/// Populates an empty namespace with a catalog of cars.
pub struct SeedLoader<'a, C> {
    store: &'a RecordStore<C>,
    strategy: SeedStrategy,
    gate: Option<Arc<dyn Lock>>,
    catalog: Vec<Car>,
}

impl<'a, C: CacheHandle> SeedLoader<'a, C> {
    /// Seeder for the default [`catalog`] using [`SeedStrategy::CheckThenSeed`].
    pub fn new(store: &'a RecordStore<C>) -> Self {
        Self {
            store,
            strategy: SeedStrategy::default(),
            gate: None,
            catalog: catalog(),
        }
    }

    pub fn with_strategy(mut self, strategy: SeedStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Gate the run behind `lock` and switch to [`SeedStrategy::Locked`].
    pub fn with_gate(mut self, lock: Arc<dyn Lock>) -> Self {
        self.gate = Some(lock);
        self.strategy = SeedStrategy::Locked;
        self
    }

    /// Replace the catalog to insert.
    pub fn with_catalog(mut self, catalog: Vec<Car>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn strategy(&self) -> SeedStrategy {
        self.strategy
    }

    /// Seed the namespace if it is empty.
    pub fn run(&self) -> SeedOutcome {
        match (self.strategy, self.gate.as_deref()) {
            (SeedStrategy::Locked, Some(gate)) => self.run_gated(gate),
            (SeedStrategy::Locked, None) => {
                warn!(
                    target = "carmart::seed",
                    namespace = %self.store.namespace(),
                    "no seed lock configured, inserting only absent records"
                );
                self.seed_if_empty(true)
            }
            (SeedStrategy::PutIfAbsent, _) => self.seed_if_empty(true),
            (SeedStrategy::CheckThenSeed, _) => self.seed_if_empty(false),
        }
    }

    fn run_gated(&self, gate: &dyn Lock) -> SeedOutcome {
        match self.store.is_empty() {
            Ok(false) => return self.already_present(),
            Ok(true) => {}
            Err(err) => return self.skipped(&err),
        }

        if let Err(err) = gate.lock() {
            error!(
                target = "carmart::seed",
                namespace = %self.store.namespace(),
                error = %err,
                "cannot take seed lock, skipping seed"
            );
            return SeedOutcome::Skipped;
        }

        let outcome = self.seed_if_empty(false);

        // Records are already written; a lost lease does not undo them.
        if let Err(err) = gate.unlock() {
            warn!(
                target = "carmart::seed",
                namespace = %self.store.namespace(),
                error = %err,
                "failed to release seed lock"
            );
        }
        outcome
    }

    fn seed_if_empty(&self, only_absent: bool) -> SeedOutcome {
        match self.store.is_empty() {
            Ok(true) => {}
            Ok(false) => return self.already_present(),
            Err(err) => return self.skipped(&err),
        }

        let mut inserted = 0;
        let mut failed = 0;
        for car in &self.catalog {
            let written = if only_absent {
                self.store.add_if_absent(car)
            } else {
                self.store.add(car).map(|_| true)
            };
            match written {
                Ok(true) => inserted += 1,
                Ok(false) => debug!(
                    target = "carmart::seed",
                    plate = %car.number_plate(),
                    "car already seeded elsewhere"
                ),
                Err(err) => {
                    failed += 1;
                    error!(
                        target = "carmart::seed",
                        plate = %car.number_plate(),
                        error = %err,
                        "failed to import car"
                    );
                }
            }
        }

        let namespace = self.store.namespace();
        if failed > 0 {
            warn!(
                target = "carmart::seed",
                namespace = %namespace,
                inserted,
                failed,
                "imported data with failures"
            );
        } else if inserted == 0 {
            info!(
                target = "carmart::seed",
                namespace = %namespace,
                "data imported by another seeder"
            );
        } else {
            info!(
                target = "carmart::seed",
                namespace = %namespace,
                inserted,
                "successfully imported data"
            );
        }
        SeedOutcome::Seeded { inserted, failed }
    }

    fn already_present(&self) -> SeedOutcome {
        info!(
            target = "carmart::seed",
            namespace = %self.store.namespace(),
            "data already present"
        );
        SeedOutcome::AlreadyPresent
    }

    fn skipped(&self, err: &crate::StoreError) -> SeedOutcome {
        error!(
            target = "carmart::seed",
            namespace = %self.store.namespace(),
            error = %err,
            "cannot inspect namespace, skipping seed"
        );
        SeedOutcome::Skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::lock::InMemoryLock;
    use std::io::{self, Write};
    use std::sync::Mutex;

    fn store() -> RecordStore<InMemoryCache> {
        RecordStore::new(InMemoryCache::new("carcache"))
    }

    #[test]
    fn catalog_has_five_distinct_plates() {
        let cars = catalog();
        assert_eq!(cars.len(), 5);
        let mut plates: Vec<_> = cars.iter().map(|c| c.number_plate().to_string()).collect();
        plates.sort();
        plates.dedup();
        assert_eq!(plates.len(), 5);
        assert_eq!(cars[0].number_plate(), "FML 23-25");
        assert_eq!(cars[4].number_plate(), "2B2 4946");
    }

    #[test]
    fn seeds_empty_namespace() {
        let store = store();
        let outcome = SeedLoader::new(&store).run();
        assert_eq!(outcome, SeedOutcome::Seeded { inserted: 5, failed: 0 });
        assert_eq!(store.get("1B2 1111").unwrap().unwrap().name, "Ford Mondeo");
    }

    #[test]
    fn skips_populated_namespace() {
        let store = store();
        let mine = Car::new("Trabant", 0.6, CarType::Sedan, "blue", "T 1", Country::Germany);
        store.add(&mine).unwrap();

        assert_eq!(SeedLoader::new(&store).run(), SeedOutcome::AlreadyPresent);
        assert_eq!(store.list_plates().unwrap(), vec!["T 1".to_string()]);
    }

    #[test]
    fn every_strategy_seeds_once() {
        for strategy in [
            SeedStrategy::CheckThenSeed,
            SeedStrategy::PutIfAbsent,
            SeedStrategy::Locked,
        ] {
            let store = store();
            let loader = SeedLoader::new(&store).with_strategy(strategy);
            assert_eq!(loader.run(), SeedOutcome::Seeded { inserted: 5, failed: 0 });
            assert_eq!(loader.run(), SeedOutcome::AlreadyPresent);
            assert_eq!(store.len().unwrap(), 5);
        }
    }

    #[test]
    fn gated_run_releases_lock() {
        let store = store();
        let gate = Arc::new(InMemoryLock::new());
        let loader = SeedLoader::new(&store).with_gate(gate.clone());
        assert_eq!(loader.strategy(), SeedStrategy::Locked);
        assert_eq!(loader.run(), SeedOutcome::Seeded { inserted: 5, failed: 0 });
        assert!(gate.try_lock().unwrap());
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged<T>(f: impl FnOnce() -> T) -> (T, String) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        let value = tracing::subscriber::with_default(subscriber, f);
        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        (value, output)
    }

    #[test]
    fn partial_import_is_logged_as_warning() {
        let store = store();
        let mut cars = catalog();
        cars[2].number_plate = String::new();

        let (outcome, output) = logged(|| SeedLoader::new(&store).with_catalog(cars).run());
        assert_eq!(outcome, SeedOutcome::Seeded { inserted: 4, failed: 1 });
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("imported data with failures"), "{output}");
        assert!(!output.contains("successfully imported data"), "{output}");
    }

    #[test]
    fn clean_import_is_logged_as_success() {
        let store = store();
        let (outcome, output) = logged(|| SeedLoader::new(&store).run());
        assert_eq!(outcome, SeedOutcome::Seeded { inserted: 5, failed: 0 });
        assert!(output.contains("successfully imported data"), "{output}");
        assert!(!output.contains("WARN"), "{output}");
    }

    #[test]
    fn bad_record_does_not_stop_the_rest() {
        let store = store();
        let mut cars = catalog();
        cars[1].number_plate = String::new();

        let outcome = SeedLoader::new(&store).with_catalog(cars).run();
        assert_eq!(outcome, SeedOutcome::Seeded { inserted: 4, failed: 1 });
        assert_eq!(store.len().unwrap(), 4);
        assert!(store.get("2B2 4946").unwrap().is_some());
    }
}
