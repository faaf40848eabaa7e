//! Frame composition: layer projection, rounded-corner masks, foreground blending and the
//! per-frame orchestrator.

/// Per-frame orchestrator.
pub mod compositor;
/// Premultiplied RGBA overlay blending.
pub mod foreground;
/// Fill/fit projection of one video layer.
pub mod layer;
/// FIFO rounded-rectangle mask cache.
pub mod mask_cache;
/// Luma thumbnails.
pub mod thumbs;
