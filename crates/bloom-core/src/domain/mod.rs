//! Domain Layer - Pure business logic
//!
//! This layer contains:
//! - Bit storage
//! - Sizing mathematics
//! - Keyed hash primitives
//! - Hash-chained index derivation
//! - The Bloom filter facade and its synchronized handle
//! - Configuration
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod bit_vector;
pub mod bloom_filter;
pub mod config;
pub mod hash_functions;
pub mod index_sequencer;
pub mod parameters;
pub mod shared;

pub use bit_vector::BitVector;
pub use bloom_filter::BloomFilter;
pub use config::{BloomConfig, BloomConfigBuilder};
pub use hash_functions::{HashKind, MurmurKeyedHash, SipKeyedHash};
pub use index_sequencer::{indices, IndexSequencer};
pub use parameters::{bits_needed, projected_fpr};
pub use shared::SharedBloomFilter;
