//! # Property Tests for the Bloom Filter
//!
//! Invariants that must hold for any key set:
//! - no false negatives
//! - `set_bit_count` is monotonic and matches the bits
//! - inserts are idempotent
//! - projected rate never decreases as bits are set

use bloom_core::{bits_needed, BloomFilter};
use proptest::collection::vec;
use proptest::prelude::*;

fn keys() -> impl Strategy<Value = Vec<String>> {
    vec("[a-z0-9]{1,12}", 1..200)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_no_false_negatives(keys in keys(), hashes in 1usize..8) {
        let mut filter = BloomFilter::new(keys.len(), hashes, 0.05).unwrap();
        for key in &keys {
            filter.insert(key);
        }
        for key in &keys {
            prop_assert!(filter.find(key), "False negative for {}", key);
        }
    }

    #[test]
    fn prop_counter_and_rate_are_monotonic(keys in keys()) {
        let mut filter = BloomFilter::new(100, 4, 0.05).unwrap();
        let mut count = filter.set_bit_count();
        let mut rate = filter.false_positive_rate();

        for key in &keys {
            filter.insert(key);
            prop_assert!(filter.set_bit_count() >= count);
            prop_assert!(filter.set_bit_count() <= filter.bit_length());
            prop_assert!(filter.false_positive_rate() >= rate);
            count = filter.set_bit_count();
            rate = filter.false_positive_rate();
        }
    }

    #[test]
    fn prop_insert_twice_equals_insert_once(keys in keys()) {
        let mut once = BloomFilter::new(200, 3, 0.1).unwrap();
        let mut twice = BloomFilter::new(200, 3, 0.1).unwrap();
        for key in &keys {
            once.insert(key);
            twice.insert(key);
            twice.insert(key);
        }

        prop_assert_eq!(once.set_bit_count(), twice.set_bit_count());
        prop_assert_eq!(once.to_bytes().unwrap(), twice.to_bytes().unwrap());
    }

    #[test]
    fn prop_snapshot_preserves_membership(keys in keys()) {
        let mut filter = BloomFilter::new(keys.len(), 4, 0.05).unwrap();
        for key in &keys {
            filter.insert(key);
        }

        let restored = BloomFilter::from_bytes(&filter.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(restored.set_bit_count(), filter.set_bit_count());
        for key in &keys {
            prop_assert!(restored.find(key));
        }
    }

    #[test]
    fn prop_bits_needed_shrinks_as_target_loosens(
        capacity in 1usize..10_000,
        hashes in 1usize..10,
        strict in 0.0001f64..0.4,
        gap in 0.05f64..0.5,
    ) {
        let loose = (strict + gap).min(0.99);
        let strict_bits = bits_needed(capacity, hashes, strict).unwrap();
        let loose_bits = bits_needed(capacity, hashes, loose).unwrap();

        prop_assert!(strict_bits >= loose_bits);
        prop_assert!(loose_bits >= 1);
    }
}
