//! Bloom filter configuration and validation
//!
//! # Example
//!
//! ```
//! use bloom_core::domain::BloomConfigBuilder;
//!
//! let config = BloomConfigBuilder::new()
//!     .key_capacity(10_000)
//!     .hash_count(4)
//!     .target_fpr(0.01)
//!     .build()
//!     .expect("valid config");
//! assert_eq!(config.key_capacity, 10_000);
//! ```

use serde::{Deserialize, Serialize};

use super::parameters::{bits_needed, validate_parameters};
use crate::error::FilterError;

/// Tuning parameters for a filter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    /// Expected number of distinct keys (n)
    pub key_capacity: usize,
    /// Indices derived per key (d)
    pub hash_count: usize,
    /// Target false positive rate (P), strictly between 0 and 1
    pub target_fpr: f64,
    /// Refuse to allocate more bits than this
    pub max_bit_length: Option<usize>,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            key_capacity: 100_000,
            hash_count: 4,
            target_fpr: 0.05,
            max_bit_length: None,
        }
    }
}

impl BloomConfig {
    /// Create a new configuration with validation
    pub fn new(key_capacity: usize, hash_count: usize, target_fpr: f64) -> Result<Self, FilterError> {
        let config = Self {
            key_capacity,
            hash_count,
            target_fpr,
            max_bit_length: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the tuning parameters
    pub fn validate(&self) -> Result<(), FilterError> {
        validate_parameters(self.key_capacity, self.hash_count, self.target_fpr)?;

        if self.max_bit_length == Some(0) {
            return Err(FilterError::invalid("max_bit_length", "cannot be 0"));
        }

        Ok(())
    }

    /// Bit length this configuration sizes to, honouring `max_bit_length`.
    pub fn bit_length(&self) -> Result<usize, FilterError> {
        self.validate()?;
        let size = bits_needed(self.key_capacity, self.hash_count, self.target_fpr)?;
        match self.max_bit_length {
            Some(max) if size > max => Err(FilterError::FilterTooLarge { size, max }),
            _ => Ok(size),
        }
    }

    /// Builder-style method to cap the bit length
    pub fn with_max_bit_length(mut self, max: usize) -> Self {
        self.max_bit_length = Some(max);
        self
    }
}

/// Builder for BloomConfig with validation
#[derive(Default)]
pub struct BloomConfigBuilder {
    key_capacity: Option<usize>,
    hash_count: Option<usize>,
    target_fpr: Option<f64>,
    max_bit_length: Option<usize>,
}

impl BloomConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_capacity(mut self, keys: usize) -> Self {
        self.key_capacity = Some(keys);
        self
    }

    pub fn hash_count(mut self, hashes: usize) -> Self {
        self.hash_count = Some(hashes);
        self
    }

    /// Set target false positive rate (must be strictly between 0 and 1)
    pub fn target_fpr(mut self, fpr: f64) -> Self {
        self.target_fpr = Some(fpr);
        self
    }

    pub fn max_bit_length(mut self, bits: usize) -> Self {
        self.max_bit_length = Some(bits);
        self
    }

    /// Build the BloomConfig, validating all parameters
    pub fn build(self) -> Result<BloomConfig, FilterError> {
        let defaults = BloomConfig::default();

        let config = BloomConfig {
            key_capacity: self.key_capacity.unwrap_or(defaults.key_capacity),
            hash_count: self.hash_count.unwrap_or(defaults.hash_count),
            target_fpr: self.target_fpr.unwrap_or(defaults.target_fpr),
            max_bit_length: self.max_bit_length.or(defaults.max_bit_length),
        };

        config.validate()?;
        Ok(config)
    }
}
