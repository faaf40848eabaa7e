use crate::buffer::alpha::AlphaMask;
use crate::buffer::yuv::{
    CHROMA_NEUTRAL, LUMA_VIDEO_BLACK, Plane, PlaneMut, Yuv420Buf, Yuv420View, Yuv420ViewMut,
};
use crate::foundation::core::MAX_CANVAS_DIM;
use crate::foundation::math::{LUMA_FLOOR, blend_luma_fx, half_up, lround};
use crate::pixel::scale::{PixelRect, scale_plane_bilinear};
use crate::scene::video_layers::{ScaleMode, VideoLayerDescriptor};

/// Mask values below this leave the destination untouched.
pub const MASK_SKIP_BELOW: u8 = 2;
/// Mask values from this up replace the destination outright.
pub const MASK_OPAQUE_FROM: u8 = 254;

/// How scaled layer pixels are written into the composite.
#[derive(Clone, Copy, Debug)]
pub enum CopyMode<'a> {
    /// Overwrite every covered pixel.
    Opaque,
    /// Blend luma by mask opacity; copy chroma wherever the mask is visible.
    Masked(&'a AlphaMask),
}

/// Where a layer's source lands: source crop, content rect inside the scaled box, box size and
/// integer canvas offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Placement {
    src: PixelRect,
    content: PixelRect,
    box_w: u32,
    box_h: u32,
    x: i64,
    y: i64,
}

impl Placement {
    fn is_boxed(&self) -> bool {
        self.content != PixelRect::sized(self.box_w, self.box_h)
    }
}

fn place_layer(src_w: u32, src_h: u32, layer: &VideoLayerDescriptor) -> Option<Placement> {
    let f = layer.frame;
    let (box_w, box_h) = (lround(f.w), lround(f.h));
    let max = i64::from(MAX_CANVAS_DIM);
    if src_w == 0 || src_h == 0 || !(1..=max).contains(&box_w) || !(1..=max).contains(&box_h) {
        return None;
    }
    let (box_w, box_h) = (box_w as u32, box_h as u32);
    let src_asp = f64::from(src_w) / f64::from(src_h);
    let dst_asp = f.w / f.h;

    let (src, content) = match layer.scale_mode {
        ScaleMode::Fill { zoom } => (
            fill_crop(src_w, src_h, src_asp, dst_asp, zoom),
            PixelRect::sized(box_w, box_h),
        ),
        ScaleMode::Fit => (
            PixelRect::sized(src_w, src_h),
            fit_content(box_w, box_h, f.w, f.h, src_asp, dst_asp),
        ),
    };
    Some(Placement {
        src,
        content,
        box_w,
        box_h,
        x: lround(f.x),
        y: lround(f.y),
    })
}

fn fill_crop(src_w: u32, src_h: u32, src_asp: f64, dst_asp: f64, zoom: f64) -> PixelRect {
    let (mut cw, mut ch) = (f64::from(src_w), f64::from(src_h));
    if src_asp > dst_asp {
        cw = (dst_asp * ch).floor();
    } else if src_asp < dst_asp {
        ch = (cw / dst_asp).floor();
    }
    let w = ((cw / zoom).floor() as u32).clamp(1, src_w);
    let h = ((ch / zoom).floor() as u32).clamp(1, src_h);
    PixelRect {
        x: (src_w - w) / 2,
        y: (src_h - h) / 2,
        w,
        h,
    }
}

fn fit_content(box_w: u32, box_h: u32, fw: f64, fh: f64, src_asp: f64, dst_asp: f64) -> PixelRect {
    if src_asp > dst_asp {
        let h = lround(fw / src_asp).clamp(1, i64::from(box_h)) as u32;
        PixelRect {
            x: 0,
            y: (box_h - h) / 2,
            w: box_w,
            h,
        }
    } else if src_asp < dst_asp {
        let w = lround(fh * src_asp).clamp(1, i64::from(box_w)) as u32;
        PixelRect {
            x: (box_w - w) / 2,
            y: 0,
            w,
            h: box_h,
        }
    } else {
        PixelRect::sized(box_w, box_h)
    }
}

/// Chroma rectangle covering every chroma sample touched by luma rect `r`.
fn chroma_rect(r: PixelRect) -> PixelRect {
    let (x0, y0) = (r.x / 2, r.y / 2);
    PixelRect {
        x: x0,
        y: y0,
        w: half_up(r.x + r.w) - x0,
        h: half_up(r.y + r.h) - y0,
    }
}

/// Source span `[s0, s1)` of a `len`-sample run placed at `offset` that lands inside `0..limit`.
fn clip_span(offset: i64, len: u32, limit: u32) -> Option<(u32, u32)> {
    let s0 = offset.saturating_neg().max(0);
    let s1 = i64::from(limit).saturating_sub(offset).min(i64::from(len));
    (s0 < s1).then_some((s0 as u32, s1 as u32))
}

fn masked_luma(src: u8, base: u8, m: u8) -> u8 {
    if m < MASK_SKIP_BELOW {
        base
    } else if m >= MASK_OPAQUE_FROM {
        src
    } else {
        let over = u32::from(src.saturating_sub(LUMA_FLOOR)) * u32::from(m);
        blend_luma_fx(over, base, m)
    }
}

/// Copy `src` onto `dst` at `(x, y)`, clipped. `mask_step` maps plane coordinates to mask
/// coordinates (1 for luma, 2 for chroma).
fn blit_plane(
    src: Plane<'_>,
    dst: &mut PlaneMut<'_>,
    x: i64,
    y: i64,
    copy: CopyMode<'_>,
    mask_step: u32,
    blend: fn(u8, u8, u8) -> u8,
) {
    let Some((x0, x1)) = clip_span(x, src.width, dst.width) else {
        return;
    };
    let Some((y0, y1)) = clip_span(y, src.height, dst.height) else {
        return;
    };
    let dx0 = (x + i64::from(x0)) as usize;
    for sy in y0..y1 {
        let srow = &src.row(sy)[x0 as usize..x1 as usize];
        let drow = &mut dst.row_mut((y + i64::from(sy)) as u32)[dx0..dx0 + srow.len()];
        match copy {
            CopyMode::Opaque => drow.copy_from_slice(srow),
            CopyMode::Masked(mask) => {
                let my = sy * mask_step;
                for (i, (d, &s)) in drow.iter_mut().zip(srow).enumerate() {
                    let m = mask.get((x0 + i as u32) * mask_step, my);
                    *d = blend(s, *d, m);
                }
            }
        }
    }
}

fn masked_chroma(src: u8, base: u8, m: u8) -> u8 {
    if m < MASK_SKIP_BELOW { base } else { src }
}

/// Projects one source frame into the composite according to a [`VideoLayerDescriptor`].
///
/// Owns the per-layer scaling scratch so steady-state frames do not allocate.
#[derive(Debug)]
pub struct LayerCompositor {
    scratch: Yuv420Buf,
}

impl Default for LayerCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerCompositor {
    /// Create a compositor with an empty scratch buffer.
    pub fn new() -> Self {
        Self {
            scratch: Yuv420Buf::new_padded(1, 1),
        }
    }

    /// Integer size of the layer's destination box, or `None` when the layer cannot be drawn.
    ///
    /// Masks for rounded corners must be rasterized at this size.
    pub fn box_size(src_w: u32, src_h: u32, layer: &VideoLayerDescriptor) -> Option<(u32, u32)> {
        place_layer(src_w, src_h, layer).map(|p| (p.box_w, p.box_h))
    }

    /// Scale `src` into the layer box and write it into `dst`.
    ///
    /// Returns `false` when nothing could be drawn (empty source or degenerate frame). Parts of the
    /// box outside `dst` are clipped.
    pub fn draw_layer(
        &mut self,
        src: Yuv420View<'_>,
        layer: &VideoLayerDescriptor,
        copy: CopyMode<'_>,
        dst: &mut Yuv420ViewMut<'_>,
    ) -> bool {
        let Some(p) = place_layer(src.width(), src.height(), layer) else {
            tracing::debug!(id = layer.id, frame = ?layer.frame, "layer has no drawable area");
            return false;
        };

        self.scratch.reshape_padded(p.box_w, p.box_h);
        if p.is_boxed() {
            self.scratch.fill(LUMA_VIDEO_BLACK, CHROMA_NEUTRAL);
        }
        {
            let [sy, scr, scb] = src.planes();
            let [mut ty, mut tcr, mut tcb] = self.scratch.planes_mut();
            scale_plane_bilinear(sy, p.src, &mut ty, p.content);
            let (csrc, ccontent) = (chroma_rect(p.src), chroma_rect(p.content));
            scale_plane_bilinear(scr, csrc, &mut tcr, ccontent);
            scale_plane_bilinear(scb, csrc, &mut tcb, ccontent);
        }

        let [sy, scr, scb] = self.scratch.view().planes();
        let [mut dy, mut dcr, mut dcb] = dst.planes_mut();
        let (cx, cy) = (p.x.div_euclid(2), p.y.div_euclid(2));
        blit_plane(sy, &mut dy, p.x, p.y, copy, 1, masked_luma);
        blit_plane(scr, &mut dcr, cx, cy, copy, 2, masked_chroma);
        blit_plane(scb, &mut dcb, cx, cy, copy, 2, masked_chroma);
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/layer.rs"]
mod tests;
