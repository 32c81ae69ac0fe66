use crate::{CoreResult, MemoError, store::PersistenceGateway};

use std::{
    collections::HashMap,
    panic::Location,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use error_location::ErrorLocation;

/// In-process key-value store.
///
/// Useful for tests and for running without a data directory. Reads and
/// writes can be made to fail to exercise the degrade-and-log paths.
#[derive(Default)]
pub struct MemoryGateway {
    values: Mutex<HashMap<String, Vec<u8>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryGateway {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `key` with raw bytes.
    pub fn insert(&self, key: &str, value: impl Into<Vec<u8>>) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.into());
    }

    /// Current raw value of `key`.
    pub fn value(&self, key: &str) -> Option<Vec<u8>> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    /// Make every subsequent `get` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn get(&self, key: &str) -> CoreResult<Option<Vec<u8>>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(MemoError::Persistence {
                reason: format!("read of {} rejected", key),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> CoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(MemoError::Persistence {
                reason: format!("write of {} rejected", key),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.insert(key, value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
