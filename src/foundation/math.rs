/// Lowest luma code in video range.
pub(crate) const LUMA_FLOOR: u8 = 16;

/// Blend numerator at which the video-range luma result saturates to 255.
pub(crate) const LUMA_SATURATE_FX: u32 = 60_945;

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn align16(v: usize) -> usize {
    (v + 15) & !15
}

pub(crate) fn half_up(v: u32) -> u32 {
    v.div_ceil(2)
}

/// Blend two video-range luma samples.
///
/// `over_weighted` is the overlay contribution already scaled by its alpha (so `0..=239*255`).
/// The base is attenuated by `255 - alpha`; the sum is divided back to 8 bits and shifted into
/// video range, saturating at 255.
pub(crate) fn blend_luma_fx(over_weighted: u32, y_base: u8, alpha: u8) -> u8 {
    let base = u32::from(y_base.saturating_sub(LUMA_FLOOR));
    let fx = over_weighted + base * (255 - u32::from(alpha));
    if fx >= LUMA_SATURATE_FX {
        255
    } else {
        (fx / 255 + u32::from(LUMA_FLOOR)) as u8
    }
}

/// Linear 8-bit mix `(over*a + base*(255-a)) / 255`, truncating.
pub(crate) fn blend_linear_u8(over: u8, base: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    ((u32::from(over) * a + u32::from(base) * (255 - a)) / 255) as u8
}

/// Round half away from zero and convert to `i64`, mapping non-finite input to 0.
pub(crate) fn lround(v: f64) -> i64 {
    if v.is_finite() { v.round() as i64 } else { 0 }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
