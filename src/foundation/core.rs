use crate::foundation::error::{YuvcompError, YuvcompResult};

/// Largest accepted frame edge, in pixels.
pub const MAX_CANVAS_DIM: u32 = 16_384;

/// Output frame number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameIndex(pub u64);

/// Frames `[start, end)` visited by a batch run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRange {
    /// First frame.
    pub start: FrameIndex,
    /// One past the last frame.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Fails with [`YuvcompError::Validation`] when `start > end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> YuvcompResult<Self> {
        if start > end {
            return Err(YuvcompError::validation(format!(
                "frame range start {} is past end {}",
                start.0, end.0
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of frames in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0 - self.start.0
    }

    /// Ascending frame indices.
    pub fn iter(self) -> impl Iterator<Item = FrameIndex> {
        (self.start.0..self.end.0).map(FrameIndex)
    }
}

/// Size of a YUV frame in luma pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Canvas {
    /// Luma width.
    pub width: u32,
    /// Luma height.
    pub height: u32,
}

impl Canvas {
    /// Both edges must be in `1..=MAX_CANVAS_DIM`; anything else is a [`YuvcompError::Invariant`].
    pub fn new(width: u32, height: u32) -> YuvcompResult<Self> {
        let ok = |d: u32| (1..=MAX_CANVAS_DIM).contains(&d);
        if !ok(width) || !ok(height) {
            return Err(YuvcompError::invariant(format!(
                "frame size {width}x{height} outside 1..={MAX_CANVAS_DIM}"
            )));
        }
        Ok(Self { width, height })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
