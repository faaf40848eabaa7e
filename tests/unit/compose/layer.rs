use super::*;
use crate::scene::video_layers::LayerFrame;

fn solid(w: u32, h: u32, y: u8, c: u8) -> Yuv420Buf {
    let mut b = Yuv420Buf::new_dense(w, h);
    b.fill(y, c);
    b
}

fn layer(x: f64, y: f64, w: f64, h: f64, scale_mode: ScaleMode) -> VideoLayerDescriptor {
    VideoLayerDescriptor {
        id: 1,
        frame: LayerFrame { x, y, w, h },
        scale_mode,
        corner_radius_px: 0.0,
    }
}

fn luma_at(buf: &Yuv420Buf, x: u32, y: u32) -> u8 {
    buf.view().y().row(y)[x as usize]
}

fn cr_at(buf: &Yuv420Buf, x: u32, y: u32) -> u8 {
    buf.view().cr().row(y)[x as usize]
}

#[test]
fn fit_letterboxes_wide_source_with_equal_black_margins() {
    let src = solid(32, 18, 200, 60);
    let mut dst = Yuv420Buf::new_padded(64, 64);
    dst.clear_to_neutral();
    let mut lc = LayerCompositor::new();
    assert!(lc.draw_layer(
        src.view(),
        &layer(0.0, 0.0, 64.0, 64.0, ScaleMode::Fit),
        CopyMode::Opaque,
        &mut dst.view_mut(),
    ));

    let column: Vec<u8> = (0..64).map(|y| luma_at(&dst, 10, y)).collect();
    let top = column.iter().take_while(|&&v| v == LUMA_VIDEO_BLACK).count();
    let bottom = column.iter().rev().take_while(|&&v| v == LUMA_VIDEO_BLACK).count();
    assert_eq!(top, 14);
    assert_eq!(bottom, 14);
    assert!(column[14..50].iter().all(|&v| v == 200));

    let chroma: Vec<u8> = (0..32).map(|y| cr_at(&dst, 5, y)).collect();
    assert!(chroma[..7].iter().all(|&v| v == CHROMA_NEUTRAL));
    assert!(chroma[7..25].iter().all(|&v| v == 60));
    assert!(chroma[25..].iter().all(|&v| v == CHROMA_NEUTRAL));
}

#[test]
fn fit_pillarboxes_tall_source() {
    let p = place_layer(9, 16, &layer(0.0, 0.0, 64.0, 64.0, ScaleMode::Fit)).unwrap();
    assert_eq!(
        p.content,
        PixelRect {
            x: 14,
            y: 0,
            w: 36,
            h: 64
        }
    );
    assert!(p.is_boxed());
}

#[test]
fn fill_crops_to_destination_aspect_and_zooms_into_centre() {
    let p = place_layer(1920, 1080, &layer(0.0, 0.0, 1080.0, 1080.0, ScaleMode::fill(1.0))).unwrap();
    assert_eq!(
        p.src,
        PixelRect {
            x: 420,
            y: 0,
            w: 1080,
            h: 1080
        }
    );
    assert!(!p.is_boxed());

    let p = place_layer(1920, 1080, &layer(0.0, 0.0, 1080.0, 1080.0, ScaleMode::fill(2.0))).unwrap();
    assert_eq!(
        p.src,
        PixelRect {
            x: 690,
            y: 270,
            w: 540,
            h: 540
        }
    );

    let p = place_layer(1080, 1920, &layer(0.0, 0.0, 1920.0, 1080.0, ScaleMode::fill(1.0))).unwrap();
    assert_eq!(
        p.src,
        PixelRect {
            x: 0,
            y: 656,
            w: 1080,
            h: 607
        }
    );
}

#[test]
fn off_canvas_layers_are_clipped() {
    let src = solid(8, 8, 200, 60);
    let mut dst = Yuv420Buf::new_padded(16, 16);
    dst.clear_to_neutral();
    let mut lc = LayerCompositor::new();

    lc.draw_layer(
        src.view(),
        &layer(-4.0, -4.0, 8.0, 8.0, ScaleMode::Fit),
        CopyMode::Opaque,
        &mut dst.view_mut(),
    );
    assert_eq!(luma_at(&dst, 0, 0), 200);
    assert_eq!(luma_at(&dst, 3, 3), 200);
    assert_eq!(luma_at(&dst, 4, 3), 0);
    assert_eq!(luma_at(&dst, 3, 4), 0);
    assert_eq!(cr_at(&dst, 1, 1), 60);
    assert_eq!(cr_at(&dst, 2, 1), CHROMA_NEUTRAL);

    lc.draw_layer(
        src.view(),
        &layer(13.0, 12.6, 8.0, 8.0, ScaleMode::Fit),
        CopyMode::Opaque,
        &mut dst.view_mut(),
    );
    assert_eq!(luma_at(&dst, 12, 15), 0);
    assert_eq!(luma_at(&dst, 13, 13), 200);
    assert_eq!(luma_at(&dst, 15, 15), 200);
    assert_eq!(luma_at(&dst, 13, 12), 0);

    let before = dst.clone();
    lc.draw_layer(
        src.view(),
        &layer(100.0, -50.0, 8.0, 8.0, ScaleMode::Fit),
        CopyMode::Opaque,
        &mut dst.view_mut(),
    );
    assert_eq!(dst, before);
}

#[test]
fn mask_thresholds_and_blend() {
    let src = solid(4, 4, 200, 60);
    let mut dst = Yuv420Buf::new_padded(4, 4);
    dst.fill(100, CHROMA_NEUTRAL);

    let mut mask = AlphaMask::new(4, 4);
    mask.row_mut(0).copy_from_slice(&[0, 1, 2, 128]);
    mask.row_mut(1).copy_from_slice(&[254, 255, 255, 255]);
    mask.row_mut(2).copy_from_slice(&[255, 255, 255, 255]);
    mask.row_mut(3).copy_from_slice(&[255, 255, 255, 255]);

    LayerCompositor::new().draw_layer(
        src.view(),
        &layer(0.0, 0.0, 4.0, 4.0, ScaleMode::fill(1.0)),
        CopyMode::Masked(&mask),
        &mut dst.view_mut(),
    );

    assert_eq!(luma_at(&dst, 0, 0), 100);
    assert_eq!(luma_at(&dst, 1, 0), 100);
    // (184*2 + 84*253) / 255 + 16
    assert_eq!(luma_at(&dst, 2, 0), 100);
    // (184*128 + 84*127) / 255 + 16
    assert_eq!(luma_at(&dst, 3, 0), 150);
    assert_eq!(luma_at(&dst, 0, 1), 200);
    assert_eq!(luma_at(&dst, 1, 1), 200);

    // Chroma follows the mask at even luma coordinates with a hard edge.
    assert_eq!(cr_at(&dst, 0, 0), CHROMA_NEUTRAL);
    assert_eq!(cr_at(&dst, 1, 0), 60);
    assert_eq!(cr_at(&dst, 0, 1), 60);
}

#[test]
fn masked_luma_endpoints() {
    for base in [0u8, 16, 100, 255] {
        assert_eq!(masked_luma(200, base, 0), base);
        assert_eq!(masked_luma(200, base, 1), base);
        assert_eq!(masked_luma(200, base, 254), 200);
        assert_eq!(masked_luma(200, base, 255), 200);
    }
}

#[test]
fn degenerate_frames_draw_nothing() {
    let src = solid(4, 4, 200, 60);
    let mut dst = Yuv420Buf::new_padded(8, 8);
    let mut lc = LayerCompositor::new();
    assert!(!lc.draw_layer(
        src.view(),
        &layer(0.0, 0.0, 0.3, 8.0, ScaleMode::Fit),
        CopyMode::Opaque,
        &mut dst.view_mut(),
    ));
    assert_eq!(
        LayerCompositor::box_size(4, 4, &layer(0.0, 0.0, 7.6, 3.2, ScaleMode::Fit)),
        Some((8, 3))
    );
    assert_eq!(
        LayerCompositor::box_size(0, 4, &layer(0.0, 0.0, 8.0, 8.0, ScaleMode::Fit)),
        None
    );
}

#[test]
fn clip_span_bounds() {
    assert_eq!(clip_span(0, 8, 16), Some((0, 8)));
    assert_eq!(clip_span(-3, 8, 16), Some((3, 8)));
    assert_eq!(clip_span(12, 8, 16), Some((0, 4)));
    assert_eq!(clip_span(16, 8, 16), None);
    assert_eq!(clip_span(-8, 8, 16), None);
    assert_eq!(clip_span(i64::MIN, 8, 16), None);
    assert_eq!(clip_span(i64::MAX, 8, 16), None);
}

#[test]
fn far_off_canvas_coordinates_are_clipped_without_overflow() {
    let src = solid(8, 8, 200, 60);
    let mut dst = Yuv420Buf::new_padded(16, 16);
    dst.clear_to_neutral();
    let before = dst.clone();
    let mut lc = LayerCompositor::new();
    for (x, y) in [(-1e300, 0.0), (1e300, 0.0), (0.0, -1e300), (0.0, 1e300)] {
        assert!(lc.draw_layer(
            src.view(),
            &layer(x, y, 8.0, 8.0, ScaleMode::default()),
            CopyMode::Opaque,
            &mut dst.view_mut(),
        ));
    }
    assert_eq!(dst, before);
}
