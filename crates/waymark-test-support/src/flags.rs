//! Test flag stores — mock `FlagStore` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;
use waymark_core::error::TourError;
use waymark_core::flags::FlagName;
use waymark_core::ports::FlagStore;

/// An in-memory flag store that records every write attempt. The first
/// `failures` writes fail with a persistence error.
#[derive(Debug, Default)]
pub struct RecordingFlagStore {
    flags: Mutex<HashMap<(Uuid, String), bool>>,
    writes: Mutex<Vec<(Uuid, FlagName, bool)>>,
    failures_remaining: AtomicUsize,
    write_attempts: AtomicUsize,
}

impl RecordingFlagStore {
    /// Creates an empty store where every write succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose first `failures` writes fail.
    #[must_use]
    pub fn failing_first(failures: usize) -> Self {
        let store = Self::default();
        store.failures_remaining.store(failures, Ordering::SeqCst);
        store
    }

    /// Pre-sets a flag without recording it as a write.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_flag(self, identity: Uuid, name: &FlagName, value: bool) -> Self {
        self.flags.lock().unwrap().insert((identity, name.key()), value);
        self
    }

    /// Returns a snapshot of the successful writes, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn writes(&self) -> Vec<(Uuid, FlagName, bool)> {
        self.writes.lock().unwrap().clone()
    }

    /// Number of write attempts, including failed ones.
    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }

    /// Current value of a flag.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn value(&self, identity: Uuid, name: &FlagName) -> bool {
        self.flags
            .lock()
            .unwrap()
            .get(&(identity, name.key()))
            .copied()
            .unwrap_or(false)
    }
}

#[async_trait]
impl FlagStore for RecordingFlagStore {
    async fn get_flag(&self, identity: Uuid, name: &FlagName) -> Result<bool, TourError> {
        Ok(self.value(identity, name))
    }

    async fn set_flag(
        &self,
        identity: Uuid,
        name: &FlagName,
        value: bool,
    ) -> Result<(), TourError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(TourError::Persistence("write rejected".into()));
        }

        self.flags
            .lock()
            .unwrap()
            .insert((identity, name.key()), value);
        self.writes
            .lock()
            .unwrap()
            .push((identity, name.clone(), value));
        Ok(())
    }
}

/// A flag store that always returns a persistence error and counts the
/// attempts made against it.
#[derive(Debug, Default)]
pub struct FailingFlagStore {
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl FailingFlagStore {
    /// Creates a failing store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get_flag` calls.
    pub fn read_attempts(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `set_flag` calls.
    pub fn write_attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FlagStore for FailingFlagStore {
    async fn get_flag(&self, _identity: Uuid, _name: &FlagName) -> Result<bool, TourError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Err(TourError::Persistence("connection refused".into()))
    }

    async fn set_flag(
        &self,
        _identity: Uuid,
        _name: &FlagName,
        _value: bool,
    ) -> Result<(), TourError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(TourError::Persistence("connection refused".into()))
    }
}
