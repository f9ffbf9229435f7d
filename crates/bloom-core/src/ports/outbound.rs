//! Outbound Ports (Driven Ports)
//!
//! The Bloom filter treats its hash function as an external collaborator.
//! Anything that maps `(bytes, seed)` deterministically onto a `u64` can drive
//! index derivation.

/// Keyed hash primitive (Driven Port)
///
/// Contract:
/// - deterministic: the same `data` and `seed` always give the same digest
/// - the full 64-bit `seed` may be any value, including a previous digest
///
/// No statistical guarantee is required beyond being well distributed in
/// practice; the projected false positive rate assumes it is.
pub trait KeyedHash: Send + Sync {
    /// Hash `data` under `seed`.
    fn hash(&self, data: &[u8], seed: u64) -> u64;
}
