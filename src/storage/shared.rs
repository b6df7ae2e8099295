use std::sync::{Arc, Mutex, MutexGuard};

use super::{HistoryCache, HistoryLookup};

/// History cache guarded for access from more than one thread.
///
/// The scheduler is the only writer; other threads only read snapshots.
#[derive(Debug, Clone)]
pub struct SharedHistory {
    inner: Arc<Mutex<HistoryCache>>,
}

impl SharedHistory {
    pub fn new(history: HistoryCache) -> Self {
        Self {
            inner: Arc::new(Mutex::new(history)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HistoryCache> {
        // add() cannot leave the cache half-updated, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add(&self, key: &str) {
        self.lock().add(key);
    }

    pub fn has(&self, key: &str) -> bool {
        self.lock().has(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn snapshot(&self) -> HistoryCache {
        self.lock().clone()
    }
}

impl HistoryLookup for SharedHistory {
    fn has(&self, key: &str) -> bool {
        SharedHistory::has(self, key)
    }
}
