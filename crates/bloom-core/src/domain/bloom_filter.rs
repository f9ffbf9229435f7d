//! Core Bloom Filter implementation
//!
//! INVARIANTS:
//! - `bit_length` is fixed at construction
//! - bits only ever go 0 -> 1
//! - `set_bit_count` equals the number of 1-bits and never decreases
//! - no false negatives: after `insert(k)`, `find(k)` is true

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::bit_vector::BitVector;
use super::config::BloomConfig;
use super::hash_functions::SipKeyedHash;
use super::index_sequencer::IndexSequencer;
use super::parameters::{bits_needed, projected_fpr, validate_parameters};
use crate::error::FilterError;
use crate::ports::KeyedHash;

/// Bloom filter for probabilistic membership testing
///
/// Sized once from `(key_capacity, hash_count, target_fpr)`. Each key maps to
/// `hash_count` bit indices derived by hash chaining. A `false` from
/// [`find`](Self::find) is certain; a `true` may be a false positive.
#[derive(Clone, Debug)]
pub struct BloomFilter<H: KeyedHash = SipKeyedHash> {
    /// Expected number of keys (n)
    key_capacity: usize,
    /// Indices per key (d)
    hash_count: usize,
    /// Design false positive rate (P), used only for sizing
    target_fpr: f64,
    /// Size in bits (N)
    bit_length: usize,
    bits: BitVector,
    /// Running count of 1-bits
    set_bit_count: usize,
    hasher: H,
}

/// On-disk form of a filter
#[derive(Serialize, Deserialize)]
struct FilterSnapshot {
    key_capacity: u64,
    hash_count: u64,
    target_fpr: f64,
    bit_length: u64,
    set_bit_count: u64,
    bits: Vec<u8>,
}

impl BloomFilter {
    /// Create a filter sized for `key_capacity` keys with `hash_count`
    /// indices per key at `target_fpr`, hashing with SipHash.
    ///
    /// # Errors
    /// `InvalidParameter` if `key_capacity < 1`, `hash_count < 1` or
    /// `target_fpr` is not strictly inside (0, 1).
    pub fn new(key_capacity: usize, hash_count: usize, target_fpr: f64) -> Result<Self, FilterError> {
        Self::with_hasher(key_capacity, hash_count, target_fpr, SipKeyedHash)
    }

    /// Create a filter from a validated configuration.
    pub fn from_config(config: &BloomConfig) -> Result<Self, FilterError> {
        Self::from_config_with_hasher(config, SipKeyedHash)
    }

    /// Restore a filter written by [`to_bytes`](BloomFilter::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FilterError> {
        Self::from_bytes_with_hasher(bytes, SipKeyedHash)
    }

    /// Bits a filter with these parameters would allocate.
    pub fn bits_needed(
        key_capacity: usize,
        hash_count: usize,
        target_fpr: f64,
    ) -> Result<usize, FilterError> {
        bits_needed(key_capacity, hash_count, target_fpr)
    }
}

impl<H: KeyedHash> BloomFilter<H> {
    /// Create a filter that derives indices with `hasher`.
    pub fn with_hasher(
        key_capacity: usize,
        hash_count: usize,
        target_fpr: f64,
        hasher: H,
    ) -> Result<Self, FilterError> {
        let bit_length = bits_needed(key_capacity, hash_count, target_fpr)?;
        Ok(Self::allocate(key_capacity, hash_count, target_fpr, bit_length, hasher))
    }

    /// Create a filter from `config`, rejecting sizes above its cap.
    pub fn from_config_with_hasher(config: &BloomConfig, hasher: H) -> Result<Self, FilterError> {
        let bit_length = config.bit_length()?;
        Ok(Self::allocate(
            config.key_capacity,
            config.hash_count,
            config.target_fpr,
            bit_length,
            hasher,
        ))
    }

    fn allocate(
        key_capacity: usize,
        hash_count: usize,
        target_fpr: f64,
        bit_length: usize,
        hasher: H,
    ) -> Self {
        debug!(
            key_capacity,
            hash_count,
            target_fpr,
            bit_length,
            bytes = bit_length.div_ceil(8),
            "Allocating bloom filter"
        );

        Self {
            key_capacity,
            hash_count,
            target_fpr,
            bit_length,
            bits: BitVector::new(bit_length),
            set_bit_count: 0,
            hasher,
        }
    }

    fn sequence<'a>(&'a self, key: &'a [u8]) -> IndexSequencer<'a, H> {
        IndexSequencer::new(&self.hasher, key, self.hash_count, self.bit_length)
    }

    /// Insert a key.
    ///
    /// Sets every one of the key's `hash_count` bits. Inserting the same
    /// key again changes nothing.
    pub fn insert(&mut self, key: &str) {
        self.insert_bytes(key.as_bytes());
    }

    /// Insert a raw byte key.
    pub fn insert_bytes(&mut self, key: &[u8]) {
        let mut newly_set = 0;
        let seq = IndexSequencer::new(&self.hasher, key, self.hash_count, self.bit_length);

        // Always walk the whole chain; find() relies on every bit being set
        for index in seq {
            let was_zero = self
                .bits
                .set(index)
                .expect("index is reduced modulo bit_length");
            if was_zero {
                newly_set += 1;
            }
        }

        self.set_bit_count += newly_set;
        trace!(newly_set, set_bit_count = self.set_bit_count, "Inserted key");
    }

    /// Test whether a key might have been inserted.
    ///
    /// Returns:
    /// - `false` if the key was definitely never inserted
    /// - `true` if it might have been (could be a false positive)
    ///
    /// Stops hashing at the first zero bit.
    pub fn find(&self, key: &str) -> bool {
        self.find_bytes(key.as_bytes())
    }

    /// Test a raw byte key.
    pub fn find_bytes(&self, key: &[u8]) -> bool {
        self.sequence(key)
            .all(|index| self.bits.get(index).expect("index is reduced modulo bit_length"))
    }

    /// Projected false positive rate from the bits currently set.
    ///
    /// Formula: (1 - φ)^d, φ = (N - set_bit_count) / N. O(1).
    pub fn false_positive_rate(&self) -> f64 {
        projected_fpr(self.bit_length, self.set_bit_count, self.hash_count)
    }

    /// Number of bits currently set to 1. O(1).
    pub fn set_bit_count(&self) -> usize {
        self.set_bit_count
    }

    /// Get the filter size in bits
    pub fn bit_length(&self) -> usize {
        self.bit_length
    }

    pub fn hash_count(&self) -> usize {
        self.hash_count
    }

    pub fn key_capacity(&self) -> usize {
        self.key_capacity
    }

    pub fn target_fpr(&self) -> f64 {
        self.target_fpr
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Serialize the filter state to bytes.
    ///
    /// The hash primitive is not stored; restore with the same one.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FilterError> {
        let snapshot = FilterSnapshot {
            key_capacity: self.key_capacity as u64,
            hash_count: self.hash_count as u64,
            target_fpr: self.target_fpr,
            bit_length: self.bit_length as u64,
            set_bit_count: self.set_bit_count as u64,
            bits: self.bits.as_raw_slice().to_vec(),
        };
        bincode::serialize(&snapshot).map_err(|e| FilterError::Serialization(e.to_string()))
    }

    /// Restore a filter that hashes with `hasher`.
    ///
    /// The snapshot is checked against the sizing formula, and its bit
    /// counter against a one-off scan of the payload.
    pub fn from_bytes_with_hasher(bytes: &[u8], hasher: H) -> Result<Self, FilterError> {
        let snapshot: FilterSnapshot =
            bincode::deserialize(bytes).map_err(|e| FilterError::Serialization(e.to_string()))?;

        let key_capacity = to_usize(snapshot.key_capacity, "key_capacity")?;
        let hash_count = to_usize(snapshot.hash_count, "hash_count")?;
        let bit_length = to_usize(snapshot.bit_length, "bit_length")?;
        let set_bit_count = to_usize(snapshot.set_bit_count, "set_bit_count")?;

        validate_parameters(key_capacity, hash_count, snapshot.target_fpr)
            .map_err(|e| FilterError::CorruptSnapshot(e.to_string()))?;

        let expected = bits_needed(key_capacity, hash_count, snapshot.target_fpr)?;
        if bit_length != expected {
            return Err(FilterError::CorruptSnapshot(format!(
                "bit length {bit_length} does not match sized length {expected}"
            )));
        }

        let bits = BitVector::from_raw(snapshot.bits, bit_length)?;
        let ones = bits.count_ones();
        if ones != set_bit_count {
            return Err(FilterError::CorruptSnapshot(format!(
                "set bit counter {set_bit_count} disagrees with {ones} set bits"
            )));
        }

        debug!(bit_length, set_bit_count, "Restored bloom filter snapshot");

        Ok(Self {
            key_capacity,
            hash_count,
            target_fpr: snapshot.target_fpr,
            bit_length,
            bits,
            set_bit_count,
            hasher,
        })
    }

    #[cfg(test)]
    pub(crate) fn bits(&self) -> &BitVector {
        &self.bits
    }
}

fn to_usize(value: u64, field: &str) -> Result<usize, FilterError> {
    usize::try_from(value)
        .map_err(|_| FilterError::CorruptSnapshot(format!("{field} {value} exceeds usize")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hash_functions::MurmurKeyedHash;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// SipHash that counts how often it is called.
    #[derive(Default)]
    struct CountingHash {
        calls: AtomicUsize,
    }

    impl KeyedHash for CountingHash {
        fn hash(&self, data: &[u8], seed: u64) -> u64 {
            self.calls.fetch_add(1, Ordering::Relaxed);
            SipKeyedHash.hash(data, seed)
        }
    }

    fn small_filter() -> BloomFilter {
        BloomFilter::new(1_000, 4, 0.05).unwrap()
    }

    #[test]
    fn test_bloom_filter_new_creates_valid_filter() {
        let filter = small_filter();

        assert_eq!(filter.key_capacity(), 1_000);
        assert_eq!(filter.hash_count(), 4);
        assert_eq!(filter.target_fpr(), 0.05);
        assert_eq!(filter.bit_length(), bits_needed(1_000, 4, 0.05).unwrap());
        assert_eq!(filter.set_bit_count(), 0, "All bits should be zero initially");
        assert_eq!(filter.false_positive_rate(), 0.0);
    }

    #[test]
    fn test_bloom_filter_rejects_invalid_parameters() {
        assert!(matches!(
            BloomFilter::new(0, 4, 0.05),
            Err(FilterError::InvalidParameter { .. })
        ));
        assert!(matches!(
            BloomFilter::new(10, 0, 0.05),
            Err(FilterError::InvalidParameter { .. })
        ));
        assert!(matches!(
            BloomFilter::new(10, 4, 1.0),
            Err(FilterError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_bloom_filter_insert_sets_bits() {
        let mut filter = small_filter();
        filter.insert("capybara");

        assert!(filter.set_bit_count() > 0);
        assert!(filter.set_bit_count() <= 4, "At most d bits for one key");
        assert_eq!(filter.set_bit_count(), filter.bits().count_ones());
    }

    #[test]
    fn test_bloom_filter_insert_is_idempotent() {
        let mut filter = small_filter();
        filter.insert("capybara");
        let bits_once = filter.bits().clone();
        let count_once = filter.set_bit_count();

        filter.insert("capybara");

        assert_eq!(filter.bits(), &bits_once);
        assert_eq!(filter.set_bit_count(), count_once);
    }

    #[test]
    fn test_bloom_filter_contains_after_insert() {
        let mut filter = small_filter();
        filter.insert("wombat");
        assert!(filter.find("wombat"));
    }

    #[test]
    fn test_bloom_filter_no_false_negatives_bulk() {
        let mut filter = small_filter();
        let keys: Vec<String> = (0..1_000).map(|i| format!("word_{:04x}", i)).collect();

        for key in &keys {
            filter.insert(key);
        }

        for key in &keys {
            assert!(filter.find(key), "False negative for {}", key);
        }
        assert_eq!(filter.set_bit_count(), filter.bits().count_ones());
    }

    #[test]
    fn test_empty_filter_finds_nothing() {
        let filter = small_filter();
        for i in 0..100 {
            assert!(!filter.find(&format!("absent_{i}")));
        }
    }

    #[test]
    fn test_find_short_circuits_on_zero_bit() {
        let filter = BloomFilter::with_hasher(1_000, 8, 0.05, CountingHash::default()).unwrap();

        assert!(!filter.find("anything"));
        assert_eq!(
            filter.hasher().calls.load(Ordering::Relaxed),
            1,
            "Empty filter must reject on the first index"
        );
    }

    #[test]
    fn test_insert_consumes_full_sequence() {
        let mut filter =
            BloomFilter::with_hasher(1_000, 8, 0.05, CountingHash::default()).unwrap();

        filter.insert("anything");
        filter.insert("anything");

        assert_eq!(filter.hasher().calls.load(Ordering::Relaxed), 16);
    }

    #[test]
    fn test_set_bit_count_is_monotonic() {
        let mut filter = small_filter();
        let mut previous = 0;
        for i in 0..500 {
            filter.insert(&format!("key_{i}"));
            assert!(filter.set_bit_count() >= previous);
            previous = filter.set_bit_count();
        }
    }

    #[test]
    fn test_false_positive_rate_tracks_set_bits() {
        let mut filter = small_filter();
        let mut previous = filter.false_positive_rate();
        for i in 0..500 {
            filter.insert(&format!("key_{i}"));
            let rate = filter.false_positive_rate();
            assert!(rate >= previous);
            previous = rate;
        }

        let phi = (filter.bit_length() - filter.set_bit_count()) as f64 / filter.bit_length() as f64;
        let expected = (1.0 - phi).powf(4.0);
        assert!((filter.false_positive_rate() - expected).abs() < 1e-15);
    }

    #[test]
    fn test_identical_filters_are_deterministic() {
        let mut a = small_filter();
        let mut b = small_filter();
        for i in 0..300 {
            let key = format!("key_{i}");
            a.insert(&key);
            b.insert(&key);
        }

        assert_eq!(a.bits(), b.bits());
        assert_eq!(a.set_bit_count(), b.set_bit_count());
    }

    #[test]
    fn test_different_hashers_set_different_bits() {
        let mut sip = small_filter();
        let mut murmur = BloomFilter::with_hasher(1_000, 4, 0.05, MurmurKeyedHash).unwrap();
        for i in 0..50 {
            let key = format!("key_{i}");
            sip.insert(&key);
            murmur.insert(&key);
        }

        assert_ne!(sip.bits(), murmur.bits());
    }

    #[test]
    fn test_from_config_honours_cap() {
        let config = BloomConfig::default().with_max_bit_length(1_000);
        assert!(matches!(
            BloomFilter::from_config(&config),
            Err(FilterError::FilterTooLarge { .. })
        ));

        let config = BloomConfig::new(1_000, 4, 0.05).unwrap();
        let filter = BloomFilter::from_config(&config).unwrap();
        assert_eq!(filter.bit_length(), small_filter().bit_length());
    }

    #[test]
    fn test_bloom_filter_serialization() {
        let mut filter = small_filter();
        filter.insert("element_1");
        filter.insert("element_2");
        filter.insert("element_3");

        let bytes = filter.to_bytes().expect("Serialization should succeed");
        let restored = BloomFilter::from_bytes(&bytes).expect("Deserialization should succeed");

        assert!(restored.find("element_1"));
        assert!(restored.find("element_2"));
        assert!(restored.find("element_3"));
        assert_eq!(restored.bits(), filter.bits());
        assert_eq!(restored.set_bit_count(), filter.set_bit_count());
        assert_eq!(restored.bit_length(), filter.bit_length());
    }

    #[test]
    fn test_snapshot_with_wrong_counter_is_rejected() {
        let mut filter = small_filter();
        filter.insert("element_1");

        let mut snapshot: FilterSnapshot = bincode::deserialize(&filter.to_bytes().unwrap()).unwrap();
        snapshot.set_bit_count += 1;
        let bytes = bincode::serialize(&snapshot).unwrap();

        assert!(matches!(
            BloomFilter::from_bytes(&bytes),
            Err(FilterError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_snapshot_with_wrong_length_is_rejected() {
        let filter = small_filter();

        let mut snapshot: FilterSnapshot = bincode::deserialize(&filter.to_bytes().unwrap()).unwrap();
        snapshot.bit_length += 8;
        let bytes = bincode::serialize(&snapshot).unwrap();

        assert!(matches!(
            BloomFilter::from_bytes(&bytes),
            Err(FilterError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_snapshot_with_oversized_payload_is_rejected() {
        let mut filter = small_filter();
        filter.insert("element_1");

        let mut snapshot: FilterSnapshot = bincode::deserialize(&filter.to_bytes().unwrap()).unwrap();
        snapshot.bits.extend_from_slice(&[0xFF; 4096]);
        let bytes = bincode::serialize(&snapshot).unwrap();

        assert!(matches!(
            BloomFilter::from_bytes(&bytes),
            Err(FilterError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_snapshot_with_set_padding_bit_is_rejected() {
        // 1_238 bits leave two padding bits in the last byte
        let filter = BloomFilter::new(100, 3, 0.01).unwrap();
        assert_eq!(filter.bit_length() % 8, 6);

        let mut snapshot: FilterSnapshot = bincode::deserialize(&filter.to_bytes().unwrap()).unwrap();
        if let Some(last) = snapshot.bits.last_mut() {
            *last |= 0b1000_0000;
        }
        let bytes = bincode::serialize(&snapshot).unwrap();

        assert!(matches!(
            BloomFilter::from_bytes(&bytes),
            Err(FilterError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_garbage_snapshot_is_rejected() {
        assert!(matches!(
            BloomFilter::from_bytes(&[1, 2, 3]),
            Err(FilterError::Serialization(_))
        ));
    }
}
