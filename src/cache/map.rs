//! Cache Map Module
//!
//! Bounded hot-tier storage with lexicographic prefix scans.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::cache::Values;

// == Cache Map ==
/// Key -> values mapping for entries resident in memory.
///
/// Sorted so that every key sharing a prefix sits in one contiguous range.
/// Capacity is enforced by the engine, not here.
#[derive(Debug, Default)]
pub struct CacheMap {
    entries: BTreeMap<String, Values>,
}

impl CacheMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Values> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Values> {
        self.entries.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or overwrites, returning the previous value.
    pub fn insert(&mut self, key: String, values: Values) -> Option<Values> {
        self.entries.insert(key, values)
    }

    pub fn remove(&mut self, key: &str) -> Option<Values> {
        self.entries.remove(key)
    }

    // == Prefix Range ==
    /// Iterates over every entry whose key starts with `prefix`, in key order.
    pub fn prefix_range<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Values)> + 'a {
        prefix_range(&self.entries, prefix)
    }

    /// Full contents, for the shutdown flush.
    pub fn entries(&self) -> &BTreeMap<String, Values> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Entries of a sorted map whose keys start with `prefix`.
///
/// Starts at the first key `>= prefix` and stops at the first key that no
/// longer carries the prefix.
pub(crate) fn prefix_range<'a>(
    entries: &'a BTreeMap<String, Values>,
    prefix: &'a str,
) -> impl Iterator<Item = (&'a String, &'a Values)> + 'a {
    entries
        .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
        .take_while(move |(key, _)| key.starts_with(prefix))
}
