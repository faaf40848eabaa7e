use super::*;

#[test]
fn align16_rounds_up() {
    assert_eq!(align16(0), 0);
    assert_eq!(align16(1), 16);
    assert_eq!(align16(16), 16);
    assert_eq!(align16(17), 32);
    assert_eq!(align16(1919), 1920);
}

#[test]
fn half_up_matches_chroma_extent() {
    assert_eq!(half_up(1), 1);
    assert_eq!(half_up(4), 2);
    assert_eq!(half_up(5), 3);
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(0, 200), 0);
}

#[test]
fn luma_blend_opaque_overlay_wins() {
    let over = u32::from(216u8 - 16) * 255;
    assert_eq!(blend_luma_fx(over, 90, 255), 216);
    assert_eq!(blend_luma_fx(239 * 255, 0, 255), 255);
}

#[test]
fn luma_blend_transparent_keeps_video_range_base() {
    for y in 16..=255u8 {
        assert_eq!(blend_luma_fx(0, y, 0), y);
    }
}

#[test]
fn linear_blend_endpoints() {
    assert_eq!(blend_linear_u8(200, 10, 255), 200);
    assert_eq!(blend_linear_u8(200, 10, 0), 10);
}

#[test]
fn lround_rounds_half_away_and_maps_nan() {
    assert_eq!(lround(2.5), 3);
    assert_eq!(lround(-2.5), -3);
    assert_eq!(lround(f64::NAN), 0);
}
