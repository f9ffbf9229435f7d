//! Index derivation by hash chaining
//!
//! Instead of `k` independent hash functions, one keyed hash is applied `k`
//! times and each digest becomes the seed of the next call:
//!
//! ```text
//! seed_0 = 0
//! digest_i = H(key, seed_i)
//! index_i  = digest_i mod m
//! seed_i+1 = digest_i
//! ```
//!
//! Indices are produced lazily so lookups can stop at the first zero bit.

use crate::ports::KeyedHash;

/// Lazy iterator over the `hash_count` bit indices of a key.
pub struct IndexSequencer<'a, H: KeyedHash + ?Sized> {
    hasher: &'a H,
    key: &'a [u8],
    seed: u64,
    remaining: usize,
    bit_length: u64,
}

impl<'a, H: KeyedHash + ?Sized> IndexSequencer<'a, H> {
    /// Start a chain for `key`.
    ///
    /// `bit_length` must be non-zero; filters never allocate zero bits.
    pub fn new(hasher: &'a H, key: &'a [u8], hash_count: usize, bit_length: usize) -> Self {
        debug_assert!(bit_length > 0, "bit_length must be non-zero");
        Self {
            hasher,
            key,
            seed: 0,
            remaining: hash_count,
            bit_length: bit_length as u64,
        }
    }
}

impl<H: KeyedHash + ?Sized> Iterator for IndexSequencer<'_, H> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let digest = self.hasher.hash(self.key, self.seed);
        self.seed = digest;
        Some((digest % self.bit_length) as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<H: KeyedHash + ?Sized> ExactSizeIterator for IndexSequencer<'_, H> {}

/// Collect the full index sequence for `key`.
pub fn indices<H: KeyedHash + ?Sized>(
    hasher: &H,
    key: &[u8],
    hash_count: usize,
    bit_length: usize,
) -> Vec<usize> {
    IndexSequencer::new(hasher, key, hash_count, bit_length).collect()
}
