//! Error types for the Bloom filter core

use thiserror::Error;

/// Errors that can occur while building, querying or restoring a filter
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    /// A tuning parameter is outside its valid domain.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A bit index fell outside the bit vector. Indicates a defect in index
    /// derivation, never a recoverable condition.
    #[error("Bit index out of range: {index} >= {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Filter size exceeds maximum: {size} > {max}")]
    FilterTooLarge { size: usize, max: usize },

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FilterError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        FilterError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
