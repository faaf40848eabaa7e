use crate::buffer::yuv::{PlaneMut, Yuv420Buf};
use crate::foundation::error::{YuvcompError, YuvcompResult};

/// BT.601 video-range luma from 8-bit RGB.
pub fn rgb_to_y(r: u8, g: u8, b: u8) -> u8 {
    let (r, g, b) = (u32::from(r), u32::from(g), u32::from(b));
    (((66 * r + 129 * g + 25 * b + 128) >> 8) + 16) as u8
}

/// BT.601 video-range Cb (U) from 8-bit RGB.
pub fn rgb_to_cb(r: u8, g: u8, b: u8) -> u8 {
    let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
    (((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128).clamp(0, 255) as u8
}

/// BT.601 video-range Cr (V) from 8-bit RGB.
pub fn rgb_to_cr(r: u8, g: u8, b: u8) -> u8 {
    let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
    (((112 * r - 94 * g - 18 * b + 128) >> 8) + 128).clamp(0, 255) as u8
}

/// Convert a packed RGBA8 raster into `dst` (Y, Cr, Cb planes).
///
/// Luma is computed per pixel. Each chroma sample uses the mean RGB of its 2x2 block; blocks on
/// an odd right or bottom edge average only the pixels that exist. Alpha is ignored, so a
/// premultiplied input yields the colour as it would appear over black.
pub fn rgba_to_i420(
    rgba: &[u8],
    width: u32,
    height: u32,
    row_bytes: usize,
    dst: &mut Yuv420Buf,
) -> YuvcompResult<()> {
    if dst.width() != width || dst.height() != height {
        return Err(YuvcompError::invariant(format!(
            "rgba_to_i420 size mismatch: {width}x{height} into {}x{}",
            dst.width(),
            dst.height()
        )));
    }
    if row_bytes < width as usize * 4 || rgba.len() < row_bytes * height as usize {
        return Err(YuvcompError::invariant(
            "rgba_to_i420 source buffer too small",
        ));
    }

    let [mut y_plane, mut cr_plane, mut cb_plane] = dst.planes_mut();
    let px = |x: u32, y: u32| -> [u8; 4] {
        let i = y as usize * row_bytes + x as usize * 4;
        [rgba[i], rgba[i + 1], rgba[i + 2], rgba[i + 3]]
    };

    for y in 0..height {
        let row = y_plane.row_mut(y);
        for (x, out) in row.iter_mut().enumerate() {
            let [r, g, b, _] = px(x as u32, y);
            *out = rgb_to_y(r, g, b);
        }
    }

    write_chroma(width, height, &px, &mut cr_plane, &mut cb_plane);
    Ok(())
}

fn write_chroma(
    width: u32,
    height: u32,
    px: &impl Fn(u32, u32) -> [u8; 4],
    cr_plane: &mut PlaneMut<'_>,
    cb_plane: &mut PlaneMut<'_>,
) {
    for cy in 0..cr_plane.height {
        for cx in 0..cr_plane.width {
            let (mut r, mut g, mut b, mut n) = (0u32, 0u32, 0u32, 0u32);
            for y in (cy * 2)..(cy * 2 + 2).min(height) {
                for x in (cx * 2)..(cx * 2 + 2).min(width) {
                    let p = px(x, y);
                    r += u32::from(p[0]);
                    g += u32::from(p[1]);
                    b += u32::from(p[2]);
                    n += 1;
                }
            }
            let avg = |v: u32| ((v + n / 2) / n) as u8;
            let (r, g, b) = (avg(r), avg(g), avg(b));
            cr_plane.row_mut(cy)[cx as usize] = rgb_to_cr(r, g, b);
            cb_plane.row_mut(cy)[cx as usize] = rgb_to_cb(r, g, b);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pixel/convert.rs"]
mod tests;
