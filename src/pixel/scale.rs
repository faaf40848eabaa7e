use crate::buffer::yuv::{Plane, PlaneMut};

/// Integer pixel rectangle inside a plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in samples.
    pub w: u32,
    /// Height in rows.
    pub h: u32,
}

impl PixelRect {
    /// Rectangle at the origin.
    pub fn sized(w: u32, h: u32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    /// Clip to a `width x height` plane.
    pub fn clamp_to(self, width: u32, height: u32) -> Self {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Self {
            x,
            y,
            w: self.w.min(width - x),
            h: self.h.min(height - y),
        }
    }

    /// Return `true` when the rectangle covers no samples.
    pub fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }
}

#[derive(Clone, Copy)]
struct Tap {
    i0: usize,
    i1: usize,
    frac: u32, // 0..=255
}

fn taps(src_len: u32, dst_len: u32) -> Vec<Tap> {
    let max = i64::from(src_len - 1) << 16;
    (0..dst_len)
        .map(|i| {
            // Sample centre of destination `i` mapped into source space, 16.16 fixed point.
            let s = ((2 * i64::from(i) + 1) * i64::from(src_len) << 16) / (2 * i64::from(dst_len))
                - (1 << 15);
            let s = s.clamp(0, max);
            let i0 = (s >> 16) as usize;
            Tap {
                i0,
                i1: (i0 + 1).min(src_len as usize - 1),
                frac: ((s >> 8) & 0xff) as u32,
            }
        })
        .collect()
}

/// Bilinear resample `src_rect` of `src` into `dst_rect` of `dst`.
///
/// Sampling is centre-aligned with 8-bit fractional weights, so equal sizes copy exactly.
/// Both rectangles are clipped to their planes first; empty rectangles are a no-op.
pub fn scale_plane_bilinear(
    src: Plane<'_>,
    src_rect: PixelRect,
    dst: &mut PlaneMut<'_>,
    dst_rect: PixelRect,
) {
    let sr = src_rect.clamp_to(src.width, src.height);
    let dr = dst_rect.clamp_to(dst.width, dst.height);
    if sr.is_empty() || dr.is_empty() {
        return;
    }

    let xs = taps(sr.w, dr.w);
    let ys = taps(sr.h, dr.h);
    let sx0 = sr.x as usize;
    for (dy, ty) in ys.iter().enumerate() {
        let r0 = &src.row(sr.y + ty.i0 as u32)[sx0..];
        let r1 = &src.row(sr.y + ty.i1 as u32)[sx0..];
        let fy = ty.frac;
        let out = &mut dst.row_mut(dr.y + dy as u32)[dr.x as usize..];
        for (o, tx) in out.iter_mut().zip(xs.iter()) {
            let fx = tx.frac;
            let top = u32::from(r0[tx.i0]) * (256 - fx) + u32::from(r0[tx.i1]) * fx;
            let bot = u32::from(r1[tx.i0]) * (256 - fx) + u32::from(r1[tx.i1]) * fx;
            *o = ((top * (256 - fy) + bot * fy + (1 << 15)) >> 16) as u8;
        }
    }
}

/// Copy a `src` plane into a same-sized `dst` plane with a different stride.
pub fn copy_plane(src: Plane<'_>, dst: &mut PlaneMut<'_>) {
    let w = src.width.min(dst.width) as usize;
    for y in 0..src.height.min(dst.height) {
        dst.row_mut(y)[..w].copy_from_slice(&src.row(y)[..w]);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pixel/scale.rs"]
mod tests;
