//! # Bloom Core
//!
//! Probabilistic set membership with no false negatives and a tunable false
//! positive rate.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `BitVector`: fixed-length bit storage, set-only
//!   - `bits_needed`: sizing from key capacity, hash count and target rate
//!   - `IndexSequencer`: lazy hash-chained index derivation
//!   - `BloomFilter`: insert / find / projected rate / set bit count
//!   - `SharedBloomFilter`: lock-guarded handle for multi-threaded callers
//!   - `BloomConfig`, `BloomConfigBuilder`: validated configuration
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `KeyedHash`: the hash primitive `(bytes, seed) -> u64`
//!
//! - **Metrics** (`metrics`): atomic counters for inserts and lookups
//!
//! ## Invariants
//!
//! - No false negatives: after `insert(k)`, `find(k)` MUST return true
//! - `set_bit_count()` equals the number of 1-bits and never decreases
//! - `false_positive_rate()` = (1 - φ)^d, φ = zero-bit proportion, computed in O(1)
//!
//! ## Usage Example
//!
//! ```
//! use bloom_core::BloomFilter;
//!
//! let mut filter = BloomFilter::new(100_000, 4, 0.05)?;
//! assert_eq!(filter.bit_length(), 624_700);
//!
//! filter.insert("aardvark");
//! assert!(filter.find("aardvark"));
//! assert!(filter.false_positive_rate() < 1e-15);
//! # Ok::<(), bloom_core::FilterError>(())
//! ```

pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;

// Re-exports for convenience
pub use domain::{
    bits_needed, BitVector, BloomConfig, BloomConfigBuilder, BloomFilter, HashKind,
    IndexSequencer, MurmurKeyedHash, SharedBloomFilter, SipKeyedHash,
};
pub use error::FilterError;
pub use metrics::{Metrics, MetricsSnapshot};
pub use ports::KeyedHash;
