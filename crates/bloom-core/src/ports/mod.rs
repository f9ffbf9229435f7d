//! Ports Layer - Trait definitions
//!
//! Outbound ports describe what the filter needs from outside the domain.
//! The only one is the keyed hash primitive.

pub mod outbound;

pub use outbound::KeyedHash;
