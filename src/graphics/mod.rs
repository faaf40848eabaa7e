//! 2D graphics backend used for the foreground overlay and rounded-corner masks.
//!
//! The compositor only talks to the backend through [`GraphicsBackend`]. [`CpuGraphics`] is the
//! built-in implementation.

use crate::buffer::alpha::AlphaMask;
use crate::foundation::error::YuvcompResult;

pub(crate) mod color;
/// CPU rasterizer built on `vello_cpu`.
pub mod cpu;
/// Display-list JSON parsing.
pub mod display_list;

pub use cpu::CpuGraphics;

/// Alpha representation of rendered RGBA output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AlphaMode {
    /// Colour channels already multiplied by alpha.
    #[default]
    Premultiplied,
    /// Straight colour channels.
    Unpremultiplied,
}

/// Rasterizer contract.
///
/// Implementations are single-threaded and may keep caches between calls.
pub trait GraphicsBackend {
    /// Render a display list into `dst`, tightly packed RGBA8 rows of `row_bytes` stride.
    ///
    /// The target is cleared to transparent before drawing. A malformed list returns
    /// [`crate::YuvcompError::Serde`] and leaves `dst` untouched; rasterization failures return
    /// [`crate::YuvcompError::Graphics`].
    fn render_display_list(
        &mut self,
        json: &str,
        dst: &mut [u8],
        width: u32,
        height: u32,
        row_bytes: usize,
        alpha_mode: AlphaMode,
    ) -> YuvcompResult<()>;

    /// Rasterize an antialiased `width x height` rounded rectangle with uniform corner `radius`.
    fn render_rounded_rect_mask(
        &mut self,
        width: u32,
        height: u32,
        radius: f64,
    ) -> YuvcompResult<AlphaMask>;
}
