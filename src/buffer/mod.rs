//! Planar YUV 4:2:0 and 8-bit alpha-mask memory layouts.

/// Rounded-rectangle opacity masks.
pub mod alpha;
/// YUV 4:2:0 layouts, owned buffers and borrowed views.
pub mod yuv;
