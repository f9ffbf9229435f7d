//! Metrics hooks for Bloom filter operations
//!
//! Counts filter allocations, inserts and lookups so a caller can compare the
//! projected false positive rate with what it actually observed.
//!
//! ## Usage
//!
//! ```
//! use bloom_core::{BloomFilter, Metrics};
//! use std::time::Instant;
//!
//! let metrics = Metrics::new();
//! let mut filter = BloomFilter::new(1_000, 4, 0.05).unwrap();
//! metrics.record_filter_created(filter.bit_length(), filter.hash_count(), 1_000);
//!
//! let before = filter.set_bit_count();
//! let start = Instant::now();
//! filter.insert("gecko");
//! metrics.record_insert(start.elapsed(), filter.set_bit_count() - before);
//!
//! let start = Instant::now();
//! let found = filter.find("gecko");
//! metrics.record_lookup(start.elapsed(), found);
//! assert_eq!(metrics.snapshot().lookups_positive, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

/// Metrics collector for Bloom filter operations
///
/// Thread-safe counters; all updates use relaxed ordering.
#[derive(Default)]
pub struct Metrics {
    /// Total filters created
    pub filters_created: AtomicU64,
    /// Total bytes allocated for bit arrays
    pub bytes_allocated: AtomicU64,
    /// Total insert calls
    pub keys_inserted: AtomicU64,
    /// Bits flipped 0 -> 1 across all inserts
    pub bits_set: AtomicU64,
    /// Total lookups performed
    pub lookups_performed: AtomicU64,
    /// Total positive lookups (true or false positives)
    pub lookups_positive: AtomicU64,
    /// Cumulative lookup time in nanoseconds
    pub lookup_time_ns: AtomicU64,
    /// Cumulative insert time in nanoseconds
    pub insert_time_ns: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record filter creation
    ///
    /// # Arguments
    /// * `bit_length` - Filter size in bits
    /// * `hash_count` - Indices per key
    /// * `key_capacity` - Expected number of keys
    pub fn record_filter_created(&self, bit_length: usize, hash_count: usize, key_capacity: usize) {
        debug!(bit_length, hash_count, key_capacity, "Filter created");
        self.filters_created.fetch_add(1, Ordering::Relaxed);
        self.bytes_allocated
            .fetch_add(bit_length.div_ceil(8) as u64, Ordering::Relaxed);
    }

    /// Record an insert and how many bits it newly set
    pub fn record_insert(&self, duration: Duration, newly_set: usize) {
        self.keys_inserted.fetch_add(1, Ordering::Relaxed);
        self.bits_set.fetch_add(newly_set as u64, Ordering::Relaxed);
        self.insert_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Record lookup operation
    ///
    /// # Arguments
    /// * `duration` - Time taken for lookup
    /// * `found` - Whether the key was reported present (possibly false positive)
    pub fn record_lookup(&self, duration: Duration, found: bool) {
        self.lookups_performed.fetch_add(1, Ordering::Relaxed);
        self.lookup_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if found {
            self.lookups_positive.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            filters_created: self.filters_created.load(Ordering::Relaxed),
            bytes_allocated: self.bytes_allocated.load(Ordering::Relaxed),
            keys_inserted: self.keys_inserted.load(Ordering::Relaxed),
            bits_set: self.bits_set.load(Ordering::Relaxed),
            lookups_performed: self.lookups_performed.load(Ordering::Relaxed),
            lookups_positive: self.lookups_positive.load(Ordering::Relaxed),
            avg_lookup_ns: self.avg_lookup_time_ns(),
            avg_insert_ns: self.avg_insert_time_ns(),
        }
    }

    /// Calculate average lookup time in nanoseconds
    pub fn avg_lookup_time_ns(&self) -> u64 {
        let total = self.lookup_time_ns.load(Ordering::Relaxed);
        let count = self.lookups_performed.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Calculate average insert time in nanoseconds
    pub fn avg_insert_time_ns(&self) -> u64 {
        let total = self.insert_time_ns.load(Ordering::Relaxed);
        let count = self.keys_inserted.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Ratio of positive lookups to total lookups.
    ///
    /// When every recorded lookup is for a key that was never inserted, this
    /// is the empirical false positive rate.
    pub fn observed_positive_rate(&self) -> f64 {
        let total = self.lookups_performed.load(Ordering::Relaxed);
        let positive = self.lookups_positive.load(Ordering::Relaxed);
        if total > 0 {
            positive as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, Serialize)]
pub struct MetricsSnapshot {
    pub filters_created: u64,
    pub bytes_allocated: u64,
    pub keys_inserted: u64,
    pub bits_set: u64,
    pub lookups_performed: u64,
    pub lookups_positive: u64,
    pub avg_lookup_ns: u64,
    pub avg_insert_ns: u64,
}
