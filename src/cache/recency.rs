//! Recency Tracker Module
//!
//! Records key touch order for LRU eviction.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

// == Recency Order ==
/// Touch order keyed by a monotonically increasing sequence number.
///
/// The smallest sequence is the least recently used key. Every key owns at
/// most one sequence, so a key can never be tracked twice.
#[derive(Debug, Default)]
struct RecencyOrder {
    by_seq: BTreeMap<u64, String>,
    seq_of: HashMap<String, u64>,
    next_seq: u64,
}

impl RecencyOrder {
    fn remove(&mut self, key: &str) -> bool {
        match self.seq_of.remove(key) {
            Some(seq) => {
                self.by_seq.remove(&seq);
                true
            }
            None => false,
        }
    }

    fn push_newest(&mut self, key: &str) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.by_seq.insert(seq, key.to_string());
        self.seq_of.insert(key.to_string(), seq);
    }
}

// == Recency Tracker ==
/// Tracks access order for LRU eviction.
///
/// Internally synchronized: the engine touches keys while holding only its
/// shared read lock, so concurrent `touch` calls must neither lose nor
/// duplicate a key. Touch and evict are O(log n).
#[derive(Debug, Default)]
pub struct RecencyTracker {
    order: Mutex<RecencyOrder>,
}

impl RecencyTracker {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used.
    ///
    /// Removal of any previous position and the append happen under one
    /// acquisition of the internal lock.
    pub fn touch(&self, key: &str) {
        let mut order = self.order.lock();
        order.remove(key);
        order.push_newest(key);
    }

    // == Remove ==
    /// Drops a key without re-appending it.
    ///
    /// Returns true if the key was tracked.
    pub fn remove(&self, key: &str) -> bool {
        self.order.lock().remove(key)
    }

    // == Evict Oldest ==
    /// Removes and returns the least recently used key.
    pub fn evict_oldest(&self) -> Option<String> {
        let mut order = self.order.lock();
        let (_, key) = order.by_seq.pop_first()?;
        order.seq_of.remove(&key);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<String> {
        self.order
            .lock()
            .by_seq
            .first_key_value()
            .map(|(_, key)| key.clone())
    }

    /// Tracked keys, least recently used first.
    pub fn oldest_first(&self) -> Vec<String> {
        self.order.lock().by_seq.values().cloned().collect()
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.lock().seq_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Contains ==
    pub fn contains(&self, key: &str) -> bool {
        self.order.lock().seq_of.contains_key(key)
    }
}
