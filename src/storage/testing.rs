//! Test doubles for the storage layer

use crate::storage::backend::{KeyValueStore, MemoryStore};
use crate::storage::error::{StorageError, StorageResult};
use std::sync::atomic::{AtomicBool, Ordering};

/// Memory store whose writes start failing once [`FailingStore::fail_writes`]
/// is called. Reads keep working.
#[derive(Debug, Default)]
pub(crate) struct FailingStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FailingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_writes(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Lock("store is read-only".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check()?;
        self.inner.remove(key)
    }
}
