//! Fixed-length bit storage
//!
//! A thin wrapper over `bitvec` that only ever sets bits. There is no clear
//! operation: filters built on it cannot delete keys.

use bitvec::prelude::*;

use crate::error::FilterError;

/// Fixed-length array of bits, all zero at allocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitVector {
    bits: BitVec<u8, Lsb0>,
}

impl BitVector {
    /// Allocate `len` zero bits.
    pub fn new(len: usize) -> Self {
        Self {
            bits: bitvec![u8, Lsb0; 0; len],
        }
    }

    /// Longest bit array `bitvec` can address.
    pub const MAX_LEN: usize = BitSlice::<u8, Lsb0>::MAX_BITS;

    /// Rebuild from raw little-endian-bit-order bytes.
    ///
    /// `bytes` must be exactly `len.div_ceil(8)` long and every padding bit
    /// past `len` in the last byte must be zero.
    pub fn from_raw(bytes: Vec<u8>, len: usize) -> Result<Self, FilterError> {
        let expected = len.div_ceil(8);
        if bytes.len() != expected {
            return Err(FilterError::CorruptSnapshot(format!(
                "{} payload bytes for {} bits, expected {}",
                bytes.len(),
                len,
                expected
            )));
        }
        let mut bits = BitVec::<u8, Lsb0>::from_vec(bytes);
        if bits[len..].any() {
            return Err(FilterError::CorruptSnapshot(format!(
                "padding past bit {len} is not zero"
            )));
        }
        bits.truncate(len);
        Ok(Self { bits })
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Read the bit at `index`.
    pub fn get(&self, index: usize) -> Result<bool, FilterError> {
        self.bits
            .get(index)
            .map(|bit| *bit)
            .ok_or(FilterError::IndexOutOfRange {
                index,
                len: self.bits.len(),
            })
    }

    /// Set the bit at `index` to 1.
    ///
    /// Returns `true` if the bit was 0 before the call, `false` if it was
    /// already set.
    pub fn set(&mut self, index: usize) -> Result<bool, FilterError> {
        let len = self.bits.len();
        if index >= len {
            return Err(FilterError::IndexOutOfRange { index, len });
        }
        let previous = self.bits.replace(index, true);
        Ok(!previous)
    }

    /// Count the 1-bits by scanning. O(len); used only to verify snapshots.
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Underlying bytes, including any padding bits past `len` in the last byte.
    pub fn as_raw_slice(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }
}
