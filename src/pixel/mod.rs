//! Planar pixel primitives: bilinear resize, plane copy and RGBA to I420 conversion.

/// BT.601 RGBA to I420 conversion.
pub mod convert;
/// Bilinear plane resampling and strided copies.
pub mod scale;
