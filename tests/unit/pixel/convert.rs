use super::*;

#[test]
fn black_and_white_hit_video_range_limits() {
    assert_eq!(rgb_to_y(0, 0, 0), 16);
    assert_eq!(rgb_to_y(255, 255, 255), 235);
    assert_eq!(rgb_to_cb(0, 0, 0), 128);
    assert_eq!(rgb_to_cr(255, 255, 255), 128);
}

#[test]
fn primaries_push_expected_chroma() {
    assert!(rgb_to_cr(255, 0, 0) > 200);
    assert!(rgb_to_cb(0, 0, 255) > 200);
    assert!(rgb_to_cb(255, 255, 0) < 40);
}

#[test]
fn transparent_raster_converts_to_black() {
    let (w, h) = (5u32, 3u32);
    let rgba = vec![0u8; (w * h * 4) as usize];
    let mut out = Yuv420Buf::new_padded(w, h);
    rgba_to_i420(&rgba, w, h, (w * 4) as usize, &mut out).unwrap();
    let v = out.view();
    for y in 0..h {
        assert!(v.y().row(y).iter().all(|&s| s == 16));
    }
    for y in 0..v.cr().height {
        assert!(v.cr().row(y).iter().all(|&s| s == 128));
        assert!(v.cb().row(y).iter().all(|&s| s == 128));
    }
}

#[test]
fn red_lands_in_cr_plane() {
    let (w, h) = (2u32, 2u32);
    let rgba = [255u8, 0, 0, 255].repeat(4);
    let mut out = Yuv420Buf::new_dense(w, h);
    rgba_to_i420(&rgba, w, h, 8, &mut out).unwrap();
    let v = out.view();
    assert_eq!(v.cr().row(0)[0], rgb_to_cr(255, 0, 0));
    assert_eq!(v.cb().row(0)[0], rgb_to_cb(255, 0, 0));
    assert_eq!(v.y().row(1)[1], rgb_to_y(255, 0, 0));
}

#[test]
fn size_mismatch_is_rejected() {
    let rgba = vec![0u8; 16];
    let mut out = Yuv420Buf::new_dense(4, 4);
    assert!(rgba_to_i420(&rgba, 2, 2, 8, &mut out).is_err());
    assert!(rgba_to_i420(&rgba, 4, 4, 16, &mut out).is_err());
}
