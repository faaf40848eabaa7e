//! Shared primitives: frame indices, canvas limits, error taxonomy and fixed-point helpers.

/// Frame indices and frame sizes.
pub mod core;
/// Crate error type.
pub mod error;
pub(crate) mod math;
