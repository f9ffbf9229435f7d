//! Keyed hash primitives
//!
//! Two implementations of the [`KeyedHash`] port. SipHash-2-4 is the default
//! because it takes a full 64-bit key, so a chained seed loses nothing.
//! MurmurHash3 is kept for speed; its 32-bit seed is folded from the chained
//! 64-bit seed.

use std::hash::Hasher;
use std::io::Cursor;

use siphasher::sip::SipHasher24;

use crate::ports::KeyedHash;

/// SipHash-2-4 keyed with `(seed, 0)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SipKeyedHash;

impl KeyedHash for SipKeyedHash {
    fn hash(&self, data: &[u8], seed: u64) -> u64 {
        let mut hasher = SipHasher24::new_with_keys(seed, 0);
        hasher.write(data);
        hasher.finish()
    }
}

/// MurmurHash3 x64/128, lower 64 bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MurmurKeyedHash;

impl KeyedHash for MurmurKeyedHash {
    fn hash(&self, data: &[u8], seed: u64) -> u64 {
        let mut cursor = Cursor::new(data);
        // Reading from an in-memory cursor cannot fail
        let hash = murmur3::murmur3_x64_128(&mut cursor, fold_seed(seed)).unwrap_or(0);
        hash as u64
    }
}

/// Fold a 64-bit seed into murmur's 32-bit seed space.
fn fold_seed(seed: u64) -> u32 {
    ((seed >> 32) ^ (seed & 0xFFFF_FFFF)) as u32
}

/// Selectable primitive, for callers that pick the hash at runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HashKind {
    #[default]
    Sip,
    Murmur,
}

impl KeyedHash for HashKind {
    fn hash(&self, data: &[u8], seed: u64) -> u64 {
        match self {
            HashKind::Sip => SipKeyedHash.hash(data, seed),
            HashKind::Murmur => MurmurKeyedHash.hash(data, seed),
        }
    }
}

impl std::str::FromStr for HashKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sip" | "siphash" => Ok(HashKind::Sip),
            "murmur" | "murmur3" => Ok(HashKind::Murmur),
            other => Err(format!("unknown hash primitive: {other}")),
        }
    }
}
