use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use super::{Lock, LockError, LockManager};

/// Process-local lock backed by `Mutex<bool>` + `Condvar`.
///
/// Unlike `std::sync::Mutex` it is not tied to a guard's scope, so it can
/// be acquired and released through the [`Lock`] trait.
pub struct InMemoryLock {
    held: Mutex<bool>,
    released: Condvar,
}

impl InMemoryLock {
    pub fn new() -> Self {
        InMemoryLock {
            held: Mutex::new(false),
            released: Condvar::new(),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, bool>, LockError> {
        self.held
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))
    }
}

impl Default for InMemoryLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Lock for InMemoryLock {
    fn lock(&self) -> Result<(), LockError> {
        let held = self.state()?;
        let mut held = self
            .released
            .wait_while(held, |held| *held)
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        *held = true;
        Ok(())
    }

    fn try_lock(&self) -> Result<bool, LockError> {
        let mut held = self.state()?;
        if *held {
            return Ok(false);
        }
        *held = true;
        Ok(true)
    }

    fn unlock(&self) -> Result<(), LockError> {
        let mut held = self.state()?;
        if *held {
            *held = false;
            self.released.notify_one();
        }
        Ok(())
    }
}

/// Lock manager handing out one [`InMemoryLock`] per name.
#[derive(Default)]
pub struct InMemoryLockManager {
    locks: Mutex<HashMap<String, Arc<InMemoryLock>>>,
}

impl InMemoryLockManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LockManager for InMemoryLockManager {
    type Lock = InMemoryLock;

    fn get_lock(&self, name: &str) -> Result<Arc<InMemoryLock>, LockError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| LockError::Poisoned("lock manager map poisoned".into()))?;
        Ok(locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InMemoryLock::new()))
            .clone())
    }
}
