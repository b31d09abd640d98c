//! Eviction Buffer Module
//!
//! Staging area for entries evicted from the hot map but not yet durable.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use crate::cache::map::prefix_range;
use crate::cache::Values;

// == Eviction Buffer ==
/// Sorted, internally synchronized map of evicted entries.
///
/// Lives outside the engine's read/write lock so the reconciler can
/// snapshot and clear it without blocking foreground writers.
#[derive(Debug, Default)]
pub struct EvictionBuffer {
    entries: Mutex<BTreeMap<String, Values>>,
}

impl EvictionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the staged value for `key`.
    pub fn get(&self, key: &str) -> Option<Values> {
        self.entries.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Stages an entry, replacing any previously staged value.
    pub fn insert(&self, key: String, values: Values) {
        self.entries.lock().insert(key, values);
    }

    pub fn remove(&self, key: &str) -> Option<Values> {
        self.entries.lock().remove(key)
    }

    // == Compare And Remove ==
    /// Removes `key` only if its staged value still equals `expected`.
    ///
    /// Comparison is by value. Returns true if the entry was removed.
    pub fn remove_if_eq(&self, key: &str, expected: &Values) -> bool {
        let mut entries = self.entries.lock();
        if entries.get(key) == Some(expected) {
            entries.remove(key);
            true
        } else {
            false
        }
    }

    // == Prefix Scan ==
    /// Copies every staged entry whose key starts with `prefix`.
    pub fn prefix_entries(&self, prefix: &str) -> Vec<(String, Values)> {
        let entries = self.entries.lock();
        prefix_range(&entries, prefix)
            .map(|(key, values)| (key.clone(), values.clone()))
            .collect()
    }

    // == Snapshot ==
    /// Point-in-time copy of the whole buffer.
    pub fn snapshot(&self) -> BTreeMap<String, Values> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
