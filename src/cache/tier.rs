//! Cold Tier Module
//!
//! Lookup chain shared by `get` and `get_all_keys` for everything below the
//! hot map.

use crate::cache::evicted::EvictionBuffer;
use crate::cache::persist::PersistentStore;
use crate::cache::Values;

// == Cold Tier ==
/// A storage tier consulted after the hot map misses.
///
/// Tiers are walked hottest first; the first tier holding a key wins.
pub trait ColdTier: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Value stored under `key` in this tier.
    fn lookup(&self, key: &str) -> Option<Values>;

    /// Every entry in this tier whose key starts with `prefix`.
    fn matching(&self, prefix: &str) -> Vec<(String, Values)>;
}

impl ColdTier for EvictionBuffer {
    fn name(&self) -> &'static str {
        "eviction-buffer"
    }

    fn lookup(&self, key: &str) -> Option<Values> {
        self.get(key)
    }

    fn matching(&self, prefix: &str) -> Vec<(String, Values)> {
        self.prefix_entries(prefix)
    }
}

/// Each call deserializes the whole file.
impl ColdTier for PersistentStore {
    fn name(&self) -> &'static str {
        "disk"
    }

    fn lookup(&self, key: &str) -> Option<Values> {
        self.load().and_then(|mut data| data.remove(key))
    }

    fn matching(&self, prefix: &str) -> Vec<(String, Values)> {
        self.load()
            .map(|data| {
                data.into_iter()
                    .filter(|(key, _)| key.starts_with(prefix))
                    .collect()
            })
            .unwrap_or_default()
    }
}
