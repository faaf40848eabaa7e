use super::*;

fn plane_mut(data: &mut [u8], width: u32, height: u32) -> PlaneMut<'_> {
    PlaneMut {
        data,
        width,
        height,
        row_bytes: width as usize,
    }
}

#[test]
fn equal_size_scale_is_exact_copy() {
    let src: Vec<u8> = (0..12).map(|v| v * 20).collect();
    let src = Plane {
        data: &src,
        width: 4,
        height: 3,
        row_bytes: 4,
    };
    let mut out = vec![0u8; 12];
    let mut dst = plane_mut(&mut out, 4, 3);
    scale_plane_bilinear(src, PixelRect::sized(4, 3), &mut dst, PixelRect::sized(4, 3));
    assert_eq!(out, src.data);
}

#[test]
fn flat_input_stays_flat_when_resized() {
    let src = vec![77u8; 6 * 4];
    let src = Plane {
        data: &src,
        width: 6,
        height: 4,
        row_bytes: 6,
    };
    let mut out = vec![0u8; 11 * 7];
    let mut dst = plane_mut(&mut out, 11, 7);
    scale_plane_bilinear(src, PixelRect::sized(6, 4), &mut dst, PixelRect::sized(11, 7));
    assert!(out.iter().all(|&v| v == 77));
}

#[test]
fn upscale_interpolates_between_neighbours() {
    let src = [0u8, 255];
    let src = Plane {
        data: &src,
        width: 2,
        height: 1,
        row_bytes: 2,
    };
    let mut out = vec![0u8; 4];
    let mut dst = plane_mut(&mut out, 4, 1);
    scale_plane_bilinear(src, PixelRect::sized(2, 1), &mut dst, PixelRect::sized(4, 1));
    assert_eq!(out[0], 0);
    assert_eq!(out[3], 255);
    assert!(out[1] > 0 && out[1] < out[2] && out[2] < 255);
}

#[test]
fn crop_and_placement_only_touch_target_rect() {
    let mut src = vec![0u8; 8 * 8];
    for y in 2..6 {
        for x in 2..6 {
            src[y * 8 + x] = 200;
        }
    }
    let src = Plane {
        data: &src,
        width: 8,
        height: 8,
        row_bytes: 8,
    };
    let mut out = vec![9u8; 6 * 6];
    let mut dst = plane_mut(&mut out, 6, 6);
    scale_plane_bilinear(
        src,
        PixelRect {
            x: 2,
            y: 2,
            w: 4,
            h: 4,
        },
        &mut dst,
        PixelRect {
            x: 1,
            y: 1,
            w: 4,
            h: 4,
        },
    );
    for y in 0..6 {
        for x in 0..6 {
            let inside = (1..5).contains(&x) && (1..5).contains(&y);
            assert_eq!(out[y * 6 + x], if inside { 200 } else { 9 }, "({x},{y})");
        }
    }
}

#[test]
fn out_of_range_rects_are_clipped() {
    let src = vec![1u8; 4];
    let src = Plane {
        data: &src,
        width: 2,
        height: 2,
        row_bytes: 2,
    };
    let mut out = vec![0u8; 4];
    let mut dst = plane_mut(&mut out, 2, 2);
    scale_plane_bilinear(
        src,
        PixelRect::sized(10, 10),
        &mut dst,
        PixelRect {
            x: 1,
            y: 1,
            w: 10,
            h: 10,
        },
    );
    assert_eq!(out, vec![0, 0, 0, 1]);
}

#[test]
fn copy_plane_respects_strides() {
    let src = [1u8, 2, 0, 0, 3, 4, 0, 0];
    let src = Plane {
        data: &src,
        width: 2,
        height: 2,
        row_bytes: 4,
    };
    let mut out = vec![0u8; 4];
    let mut dst = plane_mut(&mut out, 2, 2);
    copy_plane(src, &mut dst);
    assert_eq!(out, vec![1, 2, 3, 4]);
}
