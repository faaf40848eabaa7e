use crate::buffer::yuv::{Yuv420Buf, Yuv420View, Yuv420ViewMut};
use crate::foundation::error::{YuvcompError, YuvcompResult};
use crate::foundation::math::{LUMA_FLOOR, blend_linear_u8, blend_luma_fx};
use crate::graphics::{AlphaMode, GraphicsBackend};
use crate::pixel::convert::rgba_to_i420;

/// Composite a premultiplied RGBA overlay onto `dst`.
///
/// `overlay` is `rgba` already converted to I420. Luma is blended in video range per pixel; a
/// fully transparent pixel leaves luma untouched. Chroma is blended linearly using the alpha of
/// the even row and even column above each chroma sample.
pub fn blend_overlay(
    rgba: &[u8],
    overlay: Yuv420View<'_>,
    dst: &mut Yuv420ViewMut<'_>,
) -> YuvcompResult<()> {
    let layout = dst.layout();
    let (w, h) = (layout.width, layout.height);
    if overlay.width() != w || overlay.height() != h || rgba.len() < w as usize * h as usize * 4 {
        return Err(YuvcompError::invariant(format!(
            "foreground overlay is {}x{} but composite is {w}x{h}",
            overlay.width(),
            overlay.height()
        )));
    }
    let stride = w as usize * 4;
    let alpha = |x: u32, y: u32| rgba[y as usize * stride + x as usize * 4 + 3];

    let [oy, ocr, ocb] = overlay.planes();
    let [mut dy, mut dcr, mut dcb] = dst.planes_mut();

    for y in 0..h {
        let over = oy.row(y);
        for (x, (d, &o)) in dy.row_mut(y).iter_mut().zip(over).enumerate() {
            let a = alpha(x as u32, y);
            if a == 0 {
                continue;
            }
            let over_weighted = u32::from(o.saturating_sub(LUMA_FLOOR)) * 255;
            *d = blend_luma_fx(over_weighted, *d, a);
        }
    }

    for (src, plane) in [(ocr, &mut dcr), (ocb, &mut dcb)] {
        for cy in 0..plane.height {
            let over = src.row(cy);
            for (cx, (d, &o)) in plane.row_mut(cy).iter_mut().zip(over).enumerate() {
                let a = alpha((cx as u32 * 2).min(w - 1), cy * 2);
                *d = blend_linear_u8(o, *d, a);
            }
        }
    }
    Ok(())
}

/// Retained foreground overlay: display-list JSON, its RGBA raster and the I420 conversion.
///
/// JSON is stored on [`ForegroundBlender::set_json`] and only rasterized by the next
/// [`ForegroundBlender::prepare`], so repeated updates between frames cost nothing.
pub struct ForegroundBlender {
    width: u32,
    height: u32,
    json: Option<String>,
    dirty: bool,
    rgba: Vec<u8>,
    i420: Yuv420Buf,
    visible: bool,
}

impl ForegroundBlender {
    /// Create a transparent overlay for a `width x height` composite.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            json: None,
            dirty: false,
            rgba: vec![0; width as usize * height as usize * 4],
            i420: Yuv420Buf::new_padded(width, height),
            visible: false,
        }
    }

    /// Replace the display list. An empty or all-whitespace string clears the overlay.
    pub fn set_json(&mut self, json: impl Into<String>) {
        let json = json.into();
        self.json = (!json.trim().is_empty()).then_some(json);
        self.dirty = true;
    }

    /// Return `true` when an update is waiting to be rasterized.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Return `true` when the current overlay has any non-transparent pixel.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Current premultiplied RGBA raster, tightly packed.
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Rasterize a pending update.
    ///
    /// On failure the previous overlay stays in place and the update is dropped.
    pub fn prepare(&mut self, backend: &mut dyn GraphicsBackend) -> YuvcompResult<()> {
        if !self.dirty {
            return Ok(());
        }
        self.dirty = false;
        match self.json.as_deref() {
            Some(json) => backend.render_display_list(
                json,
                &mut self.rgba,
                self.width,
                self.height,
                self.width as usize * 4,
                AlphaMode::Premultiplied,
            )?,
            None => self.rgba.fill(0),
        }
        self.refresh()
    }

    /// Replace the overlay with an already rendered premultiplied RGBA raster.
    pub fn set_rgba(&mut self, rgba: &[u8]) -> YuvcompResult<()> {
        if rgba.len() != self.rgba.len() {
            return Err(YuvcompError::invariant(format!(
                "foreground raster must be {} bytes (got {})",
                self.rgba.len(),
                rgba.len()
            )));
        }
        self.rgba.copy_from_slice(rgba);
        self.json = None;
        self.dirty = false;
        self.refresh()
    }

    fn refresh(&mut self) -> YuvcompResult<()> {
        self.visible = self.rgba.chunks_exact(4).any(|px| px[3] != 0);
        if self.visible {
            rgba_to_i420(
                &self.rgba,
                self.width,
                self.height,
                self.width as usize * 4,
                &mut self.i420,
            )?;
        }
        Ok(())
    }

    /// Blend the overlay onto `dst`; a fully transparent overlay is skipped.
    pub fn blend_onto(&self, dst: &mut Yuv420ViewMut<'_>) -> YuvcompResult<()> {
        if !self.visible {
            return Ok(());
        }
        blend_overlay(&self.rgba, self.i420.view(), dst)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/foreground.rs"]
mod tests;
