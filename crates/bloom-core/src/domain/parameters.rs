//! Bloom filter sizing
//!
//! The model treats the bit array as `d` equal partitions and takes the
//! false positive probability to be `(1 - φ)^d`, where `φ` is the chance a
//! given bit is still zero after `n` insertions.
//!
//! Formulas:
//! - φ = 1 - P^(1/d)                 -- zero-bit proportion that yields P
//! - N = ceil(d / (1 - φ^(1/n)))     -- bits needed to keep φ after n keys
//!
//! Indices are actually drawn from one shared array through a hash chain.
//! The formula is kept literally anyway; sizes must be reproducible.

use super::bit_vector::BitVector;
use crate::error::FilterError;

/// Validate the three tuning parameters.
pub fn validate_parameters(
    key_capacity: usize,
    hash_count: usize,
    target_fpr: f64,
) -> Result<(), FilterError> {
    if key_capacity < 1 {
        return Err(FilterError::invalid("key_capacity", "must be at least 1"));
    }
    if hash_count < 1 {
        return Err(FilterError::invalid("hash_count", "must be at least 1"));
    }
    // NaN fails both comparisons and is rejected here too
    if !(target_fpr > 0.0 && target_fpr < 1.0) {
        return Err(FilterError::invalid(
            "target_fpr",
            format!("{target_fpr} is not strictly between 0 and 1"),
        ));
    }
    Ok(())
}

/// Number of bits needed to hold `key_capacity` keys with `hash_count`
/// indices per key at no more than `target_fpr` false positives.
///
/// # Errors
/// `InvalidParameter` if `key_capacity < 1`, `hash_count < 1`,
/// `target_fpr` is not strictly inside (0, 1), or the size exceeds
/// [`BitVector::MAX_LEN`].
pub fn bits_needed(
    key_capacity: usize,
    hash_count: usize,
    target_fpr: f64,
) -> Result<usize, FilterError> {
    validate_parameters(key_capacity, hash_count, target_fpr)?;

    let n = key_capacity as f64;
    let d = hash_count as f64;

    let phi = 1.0 - target_fpr.powf(1.0 / d);
    let bits = (d / (1.0 - phi.powf(1.0 / n))).ceil();

    // φ^(1/n) rounds to 1.0 for extreme inputs and the quotient blows up
    if !bits.is_finite() || bits > BitVector::MAX_LEN as f64 {
        return Err(FilterError::invalid(
            "target_fpr",
            format!("{target_fpr} needs more bits than can be addressed"),
        ));
    }

    Ok((bits as usize).max(1))
}

/// Projected false positive probability given how many of `bit_length`
/// bits are set.
///
/// Formula: FPR = (1 - φ)^d with φ = (bit_length - set_bits) / bit_length
pub fn projected_fpr(bit_length: usize, set_bits: usize, hash_count: usize) -> f64 {
    if bit_length == 0 {
        return 1.0;
    }
    let phi = (bit_length - set_bits.min(bit_length)) as f64 / bit_length as f64;
    (1.0 - phi).powf(hash_count as f64)
}
