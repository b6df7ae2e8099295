use std::collections::{HashMap, VecDeque};

use log::debug;

use crate::errors::{ReporterError, ReporterResult};

/// Read-only membership check used by the selector.
pub trait HistoryLookup {
    fn has(&self, key: &str) -> bool;
}

/// Size-limited record of published keys and how often each was seen.
///
/// Eviction is FIFO on first insertion: `has` does not refresh an entry and
/// re-adding a key only bumps its counter.
#[derive(Debug, Clone)]
pub struct HistoryCache {
    capacity: usize,
    counts: HashMap<String, u64>,
    order: VecDeque<String>,
}

impl HistoryCache {
    pub fn new(capacity: usize) -> ReporterResult<Self> {
        if capacity < 1 {
            return Err(ReporterError::InvalidConfiguration(
                "Max history size must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            capacity,
            counts: HashMap::with_capacity(capacity + 1),
            order: VecDeque::with_capacity(capacity + 1),
        })
    }

    pub fn add(&mut self, key: &str) {
        if let Some(count) = self.counts.get_mut(key) {
            *count += 1;
            return;
        }

        debug!("Added new entry to history: {}", key);
        self.counts.insert(key.to_string(), 1);
        self.order.push_back(key.to_string());

        if self.counts.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                debug!("Removed oldest entry from history: {}", oldest);
                self.counts.remove(&oldest);
            }
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.counts.contains_key(key)
    }

    /// Times `key` has been added, if it is still remembered.
    pub fn count(&self, key: &str) -> Option<u64> {
        self.counts.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys in first-seen order, oldest first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl HistoryLookup for HistoryCache {
    fn has(&self, key: &str) -> bool {
        HistoryCache::has(self, key)
    }
}
