//! Cache Engine Module
//!
//! Bounded LRU cache of string lists backed by an eviction buffer and a
//! persistent store.
//!
//! Lookups walk three tiers in order: the hot map, the eviction buffer and
//! the disk file. A hit in a colder tier promotes the entry back into the hot
//! map. The hot map and its recency tracker sit behind one read/write lock;
//! the eviction buffer and the store synchronize themselves, so disk I/O
//! never runs under the engine lock.

use std::collections::BTreeSet;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::cache::evicted::EvictionBuffer;
use crate::cache::map::CacheMap;
use crate::cache::persist::{PersistentStore, Snapshot};
use crate::cache::recency::RecencyTracker;
use crate::cache::stats::{CacheStats, StatsCounters};
use crate::cache::tier::ColdTier;
use crate::cache::{Side, Values};
use crate::config::{Config, DEFAULT_MAX_SIZE};

// == Hot Tier ==
/// Hot map and recency order, always locked together.
#[derive(Debug, Default)]
struct HotTier {
    map: CacheMap,
    recency: RecencyTracker,
}

// == LRU Persistent Cache ==
/// The cache engine.
///
/// Operations never fail: a key absent from every tier is `None`, and
/// storage failures degrade to the in-memory view after being logged.
#[derive(Debug)]
pub struct LruPersistentCache {
    hot: RwLock<HotTier>,
    evicted: EvictionBuffer,
    store: PersistentStore,
    max_size: usize,
    stats: StatsCounters,
}

impl LruPersistentCache {
    // == Constructor ==
    /// Creates an empty cache over `store`.
    ///
    /// A `max_size` of zero falls back to the default capacity.
    pub fn new(max_size: usize, store: PersistentStore) -> Self {
        Self {
            hot: RwLock::new(HotTier::default()),
            evicted: EvictionBuffer::new(),
            store,
            max_size: if max_size > 0 {
                max_size
            } else {
                DEFAULT_MAX_SIZE
            },
            stats: StatsCounters::new(),
        }
    }

    /// Creates a cache and, if `warm_start` is set, preloads persisted entries.
    pub fn open(max_size: usize, store: PersistentStore, warm_start: bool) -> Self {
        let cache = Self::new(max_size, store);
        if warm_start {
            cache.warm_from_store();
        }
        cache
    }

    /// Creates a cache from server configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::open(
            config.max_size,
            PersistentStore::new(config.persistence_file_path.clone()),
            config.warm_start,
        )
    }

    // == Warm Start ==
    /// Fills the hot map with up to `max_size` persisted entries.
    ///
    /// Returns the number of entries loaded. Entries beyond capacity stay on
    /// disk and are reached through the miss path.
    pub fn warm_from_store(&self) -> usize {
        let Some(data) = self.store.load() else {
            return 0;
        };

        let mut guard = self.hot.write();
        let hot = &mut *guard;
        let mut loaded = 0;
        for (key, values) in data {
            if hot.map.len() >= self.max_size {
                break;
            }
            if hot.map.contains(&key) {
                continue;
            }
            hot.recency.touch(&key);
            hot.map.insert(key, values);
            loaded += 1;
        }

        info!(
            "Warm start loaded {} entries from {}",
            loaded,
            self.store.path().display()
        );
        loaded
    }

    // == Get ==
    /// Looks a key up in the hot map, then the eviction buffer, then disk.
    ///
    /// A hot hit refreshes recency. A cold hit promotes the entry into the
    /// hot map; disk copies are left in place.
    pub fn get(&self, key: &str) -> Option<Values> {
        {
            let hot = self.hot.read();
            if let Some(values) = hot.map.get(key) {
                hot.recency.touch(key);
                self.stats.record_hit();
                return Some(values.clone());
            }
        }

        match self.cold_lookup(key) {
            Some(values) => {
                self.stats.record_promotion();
                Some(self.promote(key, values))
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores `values` under `key`, replacing any previous list.
    pub fn set(&self, key: &str, values: Values) {
        let mut guard = self.hot.write();
        self.insert_locked(&mut guard, key.to_string(), values, true);
    }

    // == Right Add ==
    /// Appends `value` to the list under `key`, creating it if absent.
    pub fn right_add(&self, key: &str, value: impl Into<String>) {
        self.add(key, value.into(), Side::Right);
    }

    // == Left Add ==
    /// Prepends `value` to the list under `key`, creating it if absent.
    pub fn left_add(&self, key: &str, value: impl Into<String>) {
        self.add(key, value.into(), Side::Left);
    }

    /// Pushes onto one end of a list.
    ///
    /// A key that only lives in a cold tier is revived with its stored list
    /// before the push, so appends never discard evicted data.
    fn add(&self, key: &str, value: String, side: Side) {
        {
            let mut guard = self.hot.write();
            let hot = &mut *guard;
            if let Some(values) = hot.map.get_mut(key) {
                side.push(values, value);
                hot.recency.touch(key);
                return;
            }
        }

        let observed = self.cold_lookup(key);

        let mut guard = self.hot.write();
        let hot = &mut *guard;
        if let Some(values) = hot.map.get_mut(key) {
            side.push(values, value);
            hot.recency.touch(key);
            return;
        }
        let mut values = self
            .evicted
            .remove(key)
            .or(observed)
            .unwrap_or_default();
        side.push(&mut values, value);
        self.insert_locked(hot, key.to_string(), values, false);
    }

    // == Get All Keys ==
    /// Returns every key starting with `prefix` across all three tiers.
    ///
    /// Hot matches are touched; matches found only in a colder tier are
    /// promoted exactly as `get` would.
    pub fn get_all_keys(&self, prefix: &str) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();

        {
            let hot = self.hot.read();
            for (key, _) in hot.map.prefix_range(prefix) {
                hot.recency.touch(key);
                keys.insert(key.clone());
            }
        }

        for tier in self.cold_tiers() {
            for (key, values) in tier.matching(prefix) {
                if keys.contains(&key) {
                    continue;
                }
                debug!("Promoting {} from {} during prefix scan", key, tier.name());
                self.promote(&key, values);
                keys.insert(key);
            }
        }

        keys
    }

    // == Reconcile ==
    /// Merges a snapshot of the eviction buffer into the store.
    ///
    /// Buffer values win over disk values. After a successful save, only the
    /// buffer entries still equal to the snapshot are cleared, so values
    /// re-staged during the merge survive for the next pass. Returns the
    /// number of entries cleared.
    pub fn reconcile(&self) -> usize {
        let snapshot = self.evicted.snapshot();
        if snapshot.is_empty() {
            return 0;
        }

        let mut merged = self.store.load().unwrap_or_default();
        merged.extend(snapshot.iter().map(|(k, v)| (k.clone(), v.clone())));
        if !self.store.save(&merged) {
            return 0;
        }

        let cleared = snapshot
            .iter()
            .filter(|(key, values)| self.evicted.remove_if_eq(key, values))
            .count();
        self.stats.record_reconciliation(cleared);
        info!(
            "Reconciled {} evicted entries ({} on disk, {} cleared)",
            snapshot.len(),
            merged.len(),
            cleared
        );
        cleared
    }

    /// Runs `reconcile` only once the buffer has grown past `threshold`.
    pub fn reconcile_if_needed(&self, threshold: usize) -> Option<usize> {
        let pending = self.evicted.len();
        if pending <= threshold {
            debug!(
                "Eviction buffer at {} entries, threshold {}; skipping merge",
                pending, threshold
            );
            return None;
        }
        Some(self.reconcile())
    }

    // == Persist All ==
    /// Writes the union of disk, eviction buffer and hot map to the store.
    ///
    /// Hot values win over buffered ones, which win over disk. Used for the
    /// shutdown flush. Returns false if the save failed.
    pub fn persist_all(&self) -> bool {
        // Evictions need the write lock, so the buffer snapshot taken under
        // the read lock agrees with the hot map.
        let (buffered, resident) = {
            let hot = self.hot.read();
            (self.evicted.snapshot(), hot.map.entries().clone())
        };

        let mut merged = self.store.load().unwrap_or_default();
        merged.extend(buffered);
        merged.extend(resident);
        let saved = self.store.save(&merged);
        if saved {
            info!(
                "Persisted all {} entries to {}",
                merged.len(),
                self.store.path().display()
            );
        }
        saved
    }

    // == Introspection ==
    /// Current performance counters and tier sizes.
    pub fn stats(&self) -> CacheStats {
        let resident = self.hot.read().map.len();
        self.stats.snapshot(resident, self.evicted.len())
    }

    /// Number of keys resident in the hot map.
    pub fn len(&self) -> usize {
        self.hot.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// True if `key` currently sits in the hot map.
    pub fn is_resident(&self, key: &str) -> bool {
        self.hot.read().map.contains(key)
    }

    /// True if `key` is staged in the eviction buffer.
    pub fn is_pending_eviction(&self, key: &str) -> bool {
        self.evicted.contains(key)
    }

    /// Number of entries waiting in the eviction buffer.
    pub fn pending_evictions(&self) -> usize {
        self.evicted.len()
    }

    /// Hot keys, least recently used first.
    pub fn recency_order(&self) -> Vec<String> {
        self.hot.read().recency.oldest_first()
    }

    pub fn store(&self) -> &PersistentStore {
        &self.store
    }

    /// Copy of the persisted mapping, bypassing the cache.
    pub fn load_persisted(&self) -> Option<Snapshot> {
        self.store.load()
    }

    // == Internals ==
    fn cold_tiers(&self) -> [&dyn ColdTier; 2] {
        [&self.evicted, &self.store]
    }

    fn cold_lookup(&self, key: &str) -> Option<Values> {
        self.cold_tiers().into_iter().find_map(|tier| {
            let found = tier.lookup(key);
            if found.is_some() {
                debug!("Found {} in {}", key, tier.name());
            }
            found
        })
    }

    /// Moves a cold entry into the hot map.
    ///
    /// Runs as a separate exclusive section after the lookup, so it
    /// re-resolves: a key that became hot in between is left alone, and a
    /// value re-staged in the buffer since the lookup wins over `observed`.
    /// Returns the value that ends up hot.
    fn promote(&self, key: &str, observed: Values) -> Values {
        let mut guard = self.hot.write();
        let hot = &mut *guard;
        if let Some(current) = hot.map.get(key) {
            hot.recency.touch(key);
            return current.clone();
        }

        let values = self.evicted.remove(key).unwrap_or(observed);
        self.insert_locked(hot, key.to_string(), values.clone(), false);
        values
    }

    /// Inserts under the exclusive lock, evicting LRU keys as needed.
    ///
    /// With `promote_check`, an existing recency entry for `key` is dropped
    /// first so the key is counted once. Eviction runs until fewer than
    /// `max_size` keys are tracked, then the new key is added.
    fn insert_locked(&self, hot: &mut HotTier, key: String, values: Values, promote_check: bool) {
        if promote_check && hot.map.contains(&key) {
            hot.recency.remove(&key);
        }

        while hot.recency.len() >= self.max_size {
            let Some(oldest) = hot.recency.evict_oldest() else {
                break;
            };
            if let Some(old_values) = hot.map.remove(&oldest) {
                self.evicted.insert(oldest, old_values);
                self.stats.record_eviction();
            }
        }

        // The hot map and the eviction buffer never share a key.
        self.evicted.remove(&key);
        hot.recency.touch(&key);
        hot.map.insert(key, values);

        assert!(
            hot.map.len() <= self.max_size,
            "hot map holds {} keys, capacity is {}",
            hot.map.len(),
            self.max_size
        );
        debug_assert_eq!(hot.map.len(), hot.recency.len());
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::values_of;
    use std::fs;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn cache_in(dir: &TempDir, max_size: usize) -> LruPersistentCache {
        LruPersistentCache::new(max_size, PersistentStore::new(dir.path().join("data.json")))
    }

    #[test]
    fn test_set_and_get() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);

        cache.set("key1", values_of(["a", "b"]));
        assert_eq!(cache.get("key1"), Some(values_of(["a", "b"])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);

        assert_eq!(cache.get("nonexistent"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_overwrite_keeps_single_entry() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);

        cache.set("k", values_of(["1"]));
        cache.set("k", values_of(["2"]));

        assert_eq!(cache.get("k"), Some(values_of(["2"])));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.recency_order(), vec!["k"]);
    }

    #[test]
    fn test_zero_capacity_uses_default() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 0);
        assert_eq!(cache.max_size(), DEFAULT_MAX_SIZE);
    }

    #[test]
    fn test_lru_eviction_and_promotion() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 2);

        cache.set("a", values_of(["1"]));
        cache.set("b", values_of(["2"]));
        cache.set("c", values_of(["3"]));

        assert!(!cache.is_resident("a"));
        assert!(cache.is_pending_eviction("a"));
        assert!(cache.is_resident("b"));
        assert!(cache.is_resident("c"));

        // Served from the eviction buffer and promoted, pushing b out
        assert_eq!(cache.get("a"), Some(values_of(["1"])));
        assert!(cache.is_resident("a"));
        assert!(!cache.is_pending_eviction("a"));
        assert!(!cache.is_resident("b"));
        assert!(cache.is_pending_eviction("b"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_get_refreshes_recency() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 3);

        cache.set("key1", values_of(["1"]));
        cache.set("key2", values_of(["2"]));
        cache.set("key3", values_of(["3"]));

        cache.get("key1");
        cache.set("key4", values_of(["4"]));

        assert!(cache.is_resident("key1"));
        assert!(!cache.is_resident("key2"));
        assert!(cache.is_pending_eviction("key2"));
    }

    #[test]
    fn test_append_semantics() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);

        cache.right_add("fresh", "x");
        assert_eq!(cache.get("fresh"), Some(values_of(["x"])));

        cache.set("k", values_of(["p", "q"]));
        cache.right_add("k", "x");
        assert_eq!(cache.get("k"), Some(values_of(["p", "q", "x"])));

        cache.set("k", values_of(["p", "q"]));
        cache.left_add("k", "x");
        assert_eq!(cache.get("k"), Some(values_of(["x", "p", "q"])));
    }

    #[test]
    fn test_add_refreshes_recency() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 2);

        cache.set("a", values_of(["1"]));
        cache.set("b", values_of(["2"]));
        cache.right_add("a", "more");
        cache.set("c", values_of(["3"]));

        assert!(cache.is_resident("a"));
        assert!(!cache.is_resident("b"));
    }

    #[test]
    fn test_add_revives_evicted_list() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 1);

        cache.set("a", values_of(["1"]));
        cache.set("b", values_of(["2"]));
        assert!(cache.is_pending_eviction("a"));

        cache.right_add("a", "x");
        assert_eq!(cache.get("a"), Some(values_of(["1", "x"])));
        assert!(!cache.is_pending_eviction("a"));
    }

    #[test]
    fn test_add_revives_persisted_list() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 1);

        cache.set("a", values_of(["1"]));
        cache.set("b", values_of(["2"]));
        cache.reconcile();
        assert!(!cache.is_pending_eviction("a"));

        cache.left_add("a", "x");
        assert_eq!(cache.get("a"), Some(values_of(["x", "1"])));
    }

    #[test]
    fn test_prefix_scan_across_tiers() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 1);

        cache.set("abc", values_of(["1"]));
        cache.set("abd", values_of(["2"]));
        cache.reconcile(); // abc now only on disk
        cache.set("xyz", values_of(["3"])); // abd now only in the buffer

        assert!(!cache.is_resident("abc") && !cache.is_pending_eviction("abc"));
        assert!(cache.is_pending_eviction("abd"));
        assert!(cache.is_resident("xyz"));

        let keys = cache.get_all_keys("ab");
        let expected: BTreeSet<String> = ["abc", "abd"].iter().map(|s| s.to_string()).collect();
        assert_eq!(keys, expected);
        assert!(cache.len() <= 1);
    }

    #[test]
    fn test_prefix_scan_hot_only() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 10);

        cache.set("abc", values_of(["1"]));
        cache.set("abd", values_of(["2"]));
        cache.set("xyz", values_of(["3"]));

        assert_eq!(cache.get_all_keys("ab").len(), 2);
        assert!(cache.get_all_keys("zzz").is_empty());
        assert_eq!(cache.get_all_keys("").len(), 3);
    }

    #[test]
    fn test_prefix_scan_does_not_clobber_hot_values() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 1);

        cache.set("ab", values_of(["old"]));
        cache.set("zz", values_of(["z"]));
        cache.reconcile();
        cache.set("ab", values_of(["new"]));

        cache.get_all_keys("");
        assert_eq!(cache.get("ab"), Some(values_of(["new"])));
    }

    #[test]
    fn test_reconcile_moves_buffer_to_disk() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 1);

        cache.set("a", values_of(["1"]));
        cache.set("b", values_of(["2"]));
        assert_eq!(cache.pending_evictions(), 1);

        assert_eq!(cache.reconcile(), 1);
        assert_eq!(cache.pending_evictions(), 0);

        let persisted = cache.load_persisted().unwrap();
        assert_eq!(persisted.get("a"), Some(&values_of(["1"])));
        assert!(!persisted.contains_key("b"));

        // Still reachable through the disk tier
        assert_eq!(cache.get("a"), Some(values_of(["1"])));
    }

    #[test]
    fn test_reconcile_threshold() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 1);

        cache.set("a", values_of(["1"]));
        cache.set("b", values_of(["2"]));
        cache.set("c", values_of(["3"]));

        assert_eq!(cache.reconcile_if_needed(2), None);
        assert_eq!(cache.reconcile_if_needed(1), Some(2));
    }

    #[test]
    fn test_reconcile_buffer_values_override_disk() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 1);

        cache.set("a", values_of(["v1"]));
        cache.set("b", values_of(["x"]));
        cache.reconcile();

        cache.set("a", values_of(["v2"]));
        cache.set("b", values_of(["y"]));
        cache.reconcile();

        let persisted = cache.load_persisted().unwrap();
        assert_eq!(persisted.get("a"), Some(&values_of(["v2"])));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 2);

        for i in 0..10 {
            cache.set(&format!("key{}", i), values_of([i.to_string()]));
        }
        cache.reconcile();
        let first = fs::read(cache.store().path()).unwrap();

        cache.reconcile();
        let second = fs::read(cache.store().path()).unwrap();
        assert_eq!(first, second);

        cache.persist_all();
        let third = fs::read(cache.store().path()).unwrap();
        cache.persist_all();
        let fourth = fs::read(cache.store().path()).unwrap();
        assert_eq!(third, fourth);
    }

    #[test]
    fn test_failed_save_keeps_buffer() {
        let dir = TempDir::new().unwrap();
        let store = PersistentStore::new(dir.path().join("missing").join("data.json"));
        let cache = LruPersistentCache::new(1, store);

        cache.set("a", values_of(["1"]));
        cache.set("b", values_of(["2"]));

        assert_eq!(cache.reconcile(), 0);
        assert!(cache.is_pending_eviction("a"));
        assert_eq!(cache.get("a"), Some(values_of(["1"])));
    }

    #[test]
    fn test_round_trip_across_restart() {
        let dir = TempDir::new().unwrap();
        {
            let cache = cache_in(&dir, 1);
            cache.set("a", values_of(["1", "2"]));
            cache.set("b", values_of(["3"]));
            cache.reconcile();
        }

        let restarted = LruPersistentCache::open(
            1,
            PersistentStore::new(dir.path().join("data.json")),
            false,
        );
        assert!(restarted.is_empty());
        assert_eq!(restarted.get("a"), Some(values_of(["1", "2"])));
    }

    #[test]
    fn test_persist_all_and_warm_start() {
        let dir = TempDir::new().unwrap();
        {
            let cache = cache_in(&dir, 2);
            cache.set("a", values_of(["1"]));
            cache.set("b", values_of(["2"]));
            cache.set("c", values_of(["3"]));
            assert!(cache.persist_all());
        }

        let restarted = LruPersistentCache::open(
            2,
            PersistentStore::new(dir.path().join("data.json")),
            true,
        );
        assert_eq!(restarted.len(), 2);
        for (key, value) in [("a", "1"), ("b", "2"), ("c", "3")] {
            assert_eq!(restarted.get(key), Some(values_of([value])));
        }
        assert!(restarted.len() <= 2);
    }

    #[test]
    fn test_persist_all_prefers_hot_values() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 1);

        cache.set("a", values_of(["old"]));
        cache.set("b", values_of(["b"]));
        cache.reconcile();
        cache.set("a", values_of(["new"]));
        cache.persist_all();

        let persisted = cache.load_persisted().unwrap();
        assert_eq!(persisted.get("a"), Some(&values_of(["new"])));
        assert_eq!(persisted.get("b"), Some(&values_of(["b"])));
    }

    #[test]
    fn test_stats_counts_tiers() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 1);

        cache.set("a", values_of(["1"]));
        cache.set("b", values_of(["2"]));
        cache.get("b"); // hot hit
        cache.get("a"); // promotion
        cache.get("zz"); // miss

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.promotions, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 2);
        assert_eq!(stats.resident, 1);
        assert_eq!(stats.pending_eviction, 1);
    }

    #[test]
    fn test_concurrent_writers_respect_capacity() {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(cache_in(&dir, 8));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..200 {
                        let key = format!("k{}", (t * 7 + i) % 40);
                        match i % 3 {
                            0 => cache.set(&key, values_of([i.to_string()])),
                            1 => cache.right_add(&key, "r"),
                            _ => {
                                cache.get(&key);
                            }
                        }
                        assert!(cache.len() <= 8);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 8);
        assert_eq!(cache.recency_order().len(), cache.len());
        for key in cache.recency_order() {
            assert!(!cache.is_pending_eviction(&key));
        }
    }
    #[test]
    fn test_persist_all_sees_keys_moving_between_tiers() {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(cache_in(&dir, 20));
        let keys: Vec<String> = (0..40).map(|i| format!("key{:02}", i)).collect();
        for key in &keys {
            cache.set(key, values_of([key.as_str()]));
        }

        let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let churn = {
            let cache = Arc::clone(&cache);
            let keys = keys.clone();
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                while !stop.load(std::sync::atomic::Ordering::Relaxed) {
                    for key in &keys {
                        assert!(cache.get(key).is_some());
                    }
                }
            })
        };

        for _ in 0..50 {
            // Start from an empty disk so only the in-memory tiers count.
            let _ = fs::remove_file(cache.store().path());
            assert!(cache.persist_all());
            let persisted = cache.load_persisted().unwrap();
            assert_eq!(persisted.len(), keys.len());
        }

        stop.store(true, std::sync::atomic::Ordering::Relaxed);
        churn.join().unwrap();
    }
}
