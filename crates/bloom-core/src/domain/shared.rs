//! Thread-safe filter handle
//!
//! `BloomFilter` itself is single-owner. `SharedBloomFilter` wraps it in a
//! read-write lock so the "bit is zero, set it, bump the counter" sequence of
//! an insert runs as one critical section and the counter is never
//! double-counted.

use std::sync::Arc;

use parking_lot::RwLock;

use super::bloom_filter::BloomFilter;
use super::hash_functions::SipKeyedHash;
use crate::error::FilterError;
use crate::ports::KeyedHash;

/// Cloneable, `Send + Sync` handle to one filter.
pub struct SharedBloomFilter<H: KeyedHash = SipKeyedHash> {
    inner: Arc<RwLock<BloomFilter<H>>>,
}

impl<H: KeyedHash> Clone for SharedBloomFilter<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: KeyedHash> From<BloomFilter<H>> for SharedBloomFilter<H> {
    fn from(filter: BloomFilter<H>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(filter)),
        }
    }
}

impl SharedBloomFilter {
    pub fn new(key_capacity: usize, hash_count: usize, target_fpr: f64) -> Result<Self, FilterError> {
        BloomFilter::new(key_capacity, hash_count, target_fpr).map(Self::from)
    }
}

impl<H: KeyedHash> SharedBloomFilter<H> {
    /// Insert under the write lock.
    pub fn insert(&self, key: &str) {
        self.inner.write().insert(key);
    }

    pub fn insert_bytes(&self, key: &[u8]) {
        self.inner.write().insert_bytes(key);
    }

    /// Insert a batch while holding the write lock once.
    pub fn insert_all<'k, I>(&self, keys: I)
    where
        I: IntoIterator<Item = &'k str>,
    {
        let mut filter = self.inner.write();
        for key in keys {
            filter.insert(key);
        }
    }

    pub fn find(&self, key: &str) -> bool {
        self.inner.read().find(key)
    }

    pub fn find_bytes(&self, key: &[u8]) -> bool {
        self.inner.read().find_bytes(key)
    }

    pub fn false_positive_rate(&self) -> f64 {
        self.inner.read().false_positive_rate()
    }

    pub fn set_bit_count(&self) -> usize {
        self.inner.read().set_bit_count()
    }

    pub fn bit_length(&self) -> usize {
        self.inner.read().bit_length()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, FilterError> {
        self.inner.read().to_bytes()
    }

    /// Run `f` against the filter under the read lock.
    pub fn with_filter<R>(&self, f: impl FnOnce(&BloomFilter<H>) -> R) -> R {
        f(&self.inner.read())
    }

    /// Take the filter back if this is the last handle.
    pub fn try_unwrap(self) -> Result<BloomFilter<H>, Self> {
        Arc::try_unwrap(self.inner)
            .map(|lock| lock.into_inner())
            .map_err(|inner| Self { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_shared_filter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedBloomFilter>();
    }

    #[test]
    fn test_shared_insert_and_find() {
        let shared = SharedBloomFilter::new(1_000, 4, 0.05).unwrap();
        shared.insert("koala");

        assert!(shared.find("koala"));
        assert!(shared.set_bit_count() > 0);
    }

    #[test]
    fn test_concurrent_inserts_match_sequential() {
        let shared = SharedBloomFilter::new(10_000, 4, 0.05).unwrap();
        let mut sequential = BloomFilter::new(10_000, 4, 0.05).unwrap();

        // Overlapping key ranges race on the same bits
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in (t * 500)..(t * 500 + 2_000) {
                        shared.insert(&format!("key_{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..3_500 {
            sequential.insert(&format!("key_{i}"));
        }

        assert_eq!(shared.set_bit_count(), sequential.set_bit_count());
        assert_eq!(shared.to_bytes().unwrap(), sequential.to_bytes().unwrap());
    }

    #[test]
    fn test_insert_all_batches() {
        let shared = SharedBloomFilter::new(1_000, 4, 0.05).unwrap();
        shared.insert_all(["a", "b", "c"]);

        assert!(shared.find("a") && shared.find("b") && shared.find("c"));
    }

    #[test]
    fn test_try_unwrap_last_handle() {
        let shared = SharedBloomFilter::new(1_000, 4, 0.05).unwrap();
        let other = shared.clone();

        let shared = shared.try_unwrap().expect_err("Two handles alive");
        drop(other);

        let filter = shared.try_unwrap().ok().expect("Last handle");
        assert_eq!(filter.set_bit_count(), 0);
    }
}
