//! Cache Statistics Module
//!
//! Tracks cache performance metrics. Stats are observability only and never
//! drive cache behavior.

use serde::Serialize;

// == Cache Stats ==
/// Counters plus the gauges and rates derived from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Current number of live entries
    pub total_entries: usize,
    /// Sum of `size_bytes` over live entries
    pub total_size: usize,
    /// Reads that returned a live, decodable value
    pub hits: u64,
    /// Reads that found nothing, an expired entry or an undecodable payload
    pub misses: u64,
    pub evictions: u64,
    pub compressions: u64,
    /// Reads whose compressed payload failed to decode, also counted as misses
    pub degraded_reads: u64,
    /// `hits / (hits + misses) * 100`
    pub hit_rate: f64,
    /// `misses / (hits + misses) * 100`
    pub miss_rate: f64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
        self.recompute_rates();
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
        self.recompute_rates();
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_compression(&mut self) {
        self.compressions += 1;
    }

    pub fn record_degraded_read(&mut self) {
        self.degraded_reads += 1;
    }

    // == Update Gauges ==
    /// Refreshes the live entry gauges after a mutation.
    pub fn set_live(&mut self, total_entries: usize, total_size: usize) {
        self.total_entries = total_entries;
        self.total_size = total_size;
        self.recompute_rates();
    }

    /// Rates are always derived from the raw counters, never from the
    /// previously computed percentages.
    fn recompute_rates(&mut self) {
        let total = self.hits + self.misses;
        if total == 0 {
            self.hit_rate = 0.0;
            self.miss_rate = 0.0;
        } else {
            self.hit_rate = self.hits as f64 / total as f64 * 100.0;
            self.miss_rate = self.misses as f64 / total as f64 * 100.0;
        }
    }
}
