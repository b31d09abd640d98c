//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, promotions, misses,
//! evictions and reconciliation activity.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time view of cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups answered by the hot map
    pub hits: u64,
    /// Lookups answered by the eviction buffer or disk
    pub promotions: u64,
    /// Lookups found in no tier
    pub misses: u64,
    /// Entries moved from the hot map to the eviction buffer
    pub evictions: u64,
    /// Entries cleared from the eviction buffer after a successful flush
    pub flushed: u64,
    /// Completed reconciliation merges
    pub reconciliations: u64,
    /// Keys currently resident in the hot map
    pub resident: usize,
    /// Entries currently waiting in the eviction buffer
    pub pending_eviction: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Fraction of lookups served from any tier.
    ///
    /// Returns 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let found = self.hits + self.promotions;
        let total = found + self.misses;
        if total == 0 {
            0.0
        } else {
            found as f64 / total as f64
        }
    }
}

// == Stats Counters ==
/// Lock-free counters updated from both foreground calls and the reconciler.
#[derive(Debug, Default)]
pub struct StatsCounters {
    hits: AtomicU64,
    promotions: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    flushed: AtomicU64,
    reconciliations: AtomicU64,
}

impl StatsCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_promotion(&self) {
        self.promotions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one merge that cleared `count` buffer entries.
    pub fn record_reconciliation(&self, count: usize) {
        self.reconciliations.fetch_add(1, Ordering::Relaxed);
        self.flushed.fetch_add(count as u64, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Reads every counter, pairing them with current tier sizes.
    pub fn snapshot(&self, resident: usize, pending_eviction: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            flushed: self.flushed.load(Ordering::Relaxed),
            reconciliations: self.reconciliations.load(Ordering::Relaxed),
            resident,
            pending_eviction,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = StatsCounters::new().snapshot(0, 0);
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_counts_promotions_as_found() {
        let counters = StatsCounters::new();
        counters.record_hit();
        counters.record_promotion();
        counters.record_miss();
        counters.record_miss();
        assert_eq!(counters.snapshot(0, 0).hit_rate(), 0.5);
    }

    #[test]
    fn test_record_reconciliation() {
        let counters = StatsCounters::new();
        counters.record_reconciliation(3);
        counters.record_reconciliation(2);

        let stats = counters.snapshot(7, 1);
        assert_eq!(stats.reconciliations, 2);
        assert_eq!(stats.flushed, 5);
        assert_eq!(stats.resident, 7);
        assert_eq!(stats.pending_eviction, 1);
    }

    #[test]
    fn test_record_eviction() {
        let counters = StatsCounters::new();
        counters.record_eviction();
        counters.record_eviction();
        assert_eq!(counters.snapshot(0, 0).evictions, 2);
    }
}
