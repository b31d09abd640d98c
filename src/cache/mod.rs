//! Cache Module
//!
//! Bounded LRU cache of string lists with a staging buffer for evicted
//! entries and whole-file disk persistence.

mod engine;
mod entry;
mod evicted;
mod map;
mod persist;
mod recency;
mod stats;
mod tier;


// Re-export public types
pub use engine::LruPersistentCache;
pub use entry::{values_of, Side, Values};
pub use evicted::EvictionBuffer;
pub use map::CacheMap;
pub use persist::{PersistentStore, Snapshot};
pub use recency::RecencyTracker;
pub use stats::{CacheStats, StatsCounters};
pub use tier::ColdTier;
