use super::*;
use crate::buffer::alpha::AlphaMask;
use crate::buffer::yuv::Yuv420Layout;
use crate::compose::thumbs::{Thumbnail, ThumbnailMode};
use crate::graphics::AlphaMode;

/// Paints the whole overlay opaque white; masks are opaque except the top-left pixel.
struct StubGraphics;

impl GraphicsBackend for StubGraphics {
    fn render_display_list(
        &mut self,
        json: &str,
        dst: &mut [u8],
        _width: u32,
        _height: u32,
        _row_bytes: usize,
        _alpha_mode: AlphaMode,
    ) -> YuvcompResult<()> {
        if json == "bad" {
            return Err(YuvcompError::serde("bad display list"));
        }
        dst.fill(255);
        Ok(())
    }

    fn render_rounded_rect_mask(
        &mut self,
        width: u32,
        height: u32,
        _radius: f64,
    ) -> YuvcompResult<AlphaMask> {
        let mut m = AlphaMask::new(width, height);
        for y in 0..height {
            m.row_mut(y).fill(255);
        }
        m.row_mut(0)[0] = 0;
        Ok(m)
    }
}

fn compositor(w: u32, h: u32) -> YuvCompositor {
    YuvCompositor::with_graphics(
        w,
        h,
        Box::new(StubGraphics),
        CompositorOpts {
            mask_cache_capacity: DEFAULT_MASK_CACHE_CAPACITY,
            thumbnails: None,
        },
    )
    .unwrap()
}

fn solid(w: u32, h: u32, y: u8) -> Yuv420Buf {
    let mut b = Yuv420Buf::new_dense(w, h);
    b.fill(y, 100);
    b
}

const TWO_LAYERS: &str = r#"[
  {"type":"video","id":1,"frame":{"x":0,"y":0,"w":8,"h":8},"attrs":{"scaleMode":"fill"}},
  {"type":"video","id":2,"frame":{"x":8,"y":0,"w":8,"h":8},"attrs":{"scaleMode":"fit"}}
]"#;

fn inputs() -> BTreeMap<u32, Yuv420Buf> {
    BTreeMap::from([(1, solid(16, 16, 50)), (2, solid(16, 16, 150))])
}

fn luma(view: &Yuv420View<'_>, x: u32, y: u32) -> u8 {
    view.y().row(y)[x as usize]
}

#[test]
fn rejects_bad_canvas() {
    assert!(matches!(
        YuvCompositor::with_graphics(0, 8, Box::new(StubGraphics), CompositorOpts::default()),
        Err(YuvcompError::Invariant(_))
    ));
    assert!(YuvCompositor::with_graphics(20_000, 8, Box::new(StubGraphics), CompositorOpts::default()).is_err());
}

#[test]
fn default_opts_ignore_the_environment() {
    assert_eq!(
        CompositorOpts::default(),
        CompositorOpts {
            mask_cache_capacity: DEFAULT_MASK_CACHE_CAPACITY,
            thumbnails: None,
        }
    );
    assert_eq!(mask_cache_capacity_from(Some("32")), 32);
    assert_eq!(mask_cache_capacity_from(Some(" 7 ")), 7);
    for bad in [None, Some(""), Some("0"), Some("-3"), Some("lots")] {
        assert_eq!(mask_cache_capacity_from(bad), DEFAULT_MASK_CACHE_CAPACITY);
    }
}

#[test]
fn layer_list_is_retained_across_frames() {
    let mut c = compositor(16, 8);
    assert!(c.set_video_layers(TWO_LAYERS));
    let inputs = inputs();
    let first = c.render_frame(FrameIndex(0), &inputs).unwrap().data().to_vec();
    assert_eq!(luma(&c.render_frame(FrameIndex(0), &inputs).unwrap(), 0, 0), 50);
    for f in 1..=10 {
        let out = c.render_frame(FrameIndex(f), &inputs).unwrap();
        assert_eq!(out.data(), &first[..]);
        assert_eq!(luma(&out, 3, 3), 50);
        assert_eq!(luma(&out, 12, 3), 150);
    }
}

#[test]
fn failed_update_keeps_previous_layers() {
    let mut c = compositor(16, 8);
    assert!(c.set_video_layers(TWO_LAYERS));
    assert!(!c.set_video_layers("not json"));
    assert!(matches!(
        c.try_set_video_layers("[{\"id\":1}]", 1.0),
        Err(YuvcompError::Serde(_))
    ));
    assert_eq!(c.video_layers().len(), 2);
    let out = c.render_frame(FrameIndex(0), &inputs()).unwrap();
    assert_eq!(luma(&out, 12, 3), 150);
}

#[test]
fn missing_inputs_are_skipped() {
    let mut c = compositor(16, 8);
    c.set_video_layers(TWO_LAYERS);
    let only_two = BTreeMap::from([(2, solid(16, 16, 150))]);
    let out = c.render_frame(FrameIndex(0), &only_two).unwrap();
    assert_eq!(luma(&out, 3, 3), 0);
    assert_eq!(out.cr().row(0)[0], 128);
    assert_eq!(luma(&out, 12, 3), 150);
}

#[test]
fn later_layers_draw_over_earlier_ones() {
    let mut c = compositor(8, 8);
    c.set_video_layers(
        r#"[{"id":1,"frame":{"x":0,"y":0,"w":8,"h":8}},{"id":2,"frame":{"x":4,"y":0,"w":4,"h":8}}]"#,
    );
    let out = c.render_frame(FrameIndex(0), &inputs()).unwrap();
    assert_eq!(luma(&out, 3, 0), 50);
    assert_eq!(luma(&out, 4, 0), 150);
}

#[test]
fn rounded_layers_use_cached_masks() {
    let mut c = compositor(16, 8);
    c.set_video_layers(
        r#"[{"id":1,"frame":{"x":0,"y":0,"w":8,"h":8},"attrs":{"cornerRadiusPx":3}}]"#,
    );
    let inputs = inputs();
    for f in 0..3 {
        let out = c.render_frame(FrameIndex(f), &inputs).unwrap();
        assert_eq!(luma(&out, 0, 0), 0);
        assert_eq!(luma(&out, 1, 0), 50);
    }
    let stats = c.mask_cache_stats();
    assert_eq!((stats.misses, stats.hits), (1, 2));
}

#[test]
fn foreground_is_lazy_and_blended_last() {
    let mut c = compositor(8, 8);
    c.set_video_layers(r#"[{"id":1,"frame":{"x":0,"y":0,"w":8,"h":8}}]"#);
    assert!(c.set_foreground("{}"));
    let out = c.render_frame(FrameIndex(0), &inputs()).unwrap();
    assert_eq!(luma(&out, 2, 2), 235);

    // A failing update keeps the previous overlay.
    c.set_foreground("bad");
    let out = c.render_frame(FrameIndex(1), &inputs()).unwrap();
    assert_eq!(luma(&out, 2, 2), 235);

    c.set_foreground("");
    let out = c.render_frame(FrameIndex(2), &inputs()).unwrap();
    assert_eq!(luma(&out, 2, 2), 50);
}

#[test]
fn scene_update_applies_both_channels() {
    let mut c = compositor(16, 8);
    let update = SceneUpdateAtFrame {
        index: FrameIndex(0),
        video_layers_json: Some(r#"[{"id":2,"frame":{"x":0,"y":0,"w":4,"h":4}}]"#.to_owned()),
        foreground_json: None,
        layer_scale: 2.0,
    };
    assert!(c.apply_scene_update(&update));
    assert_eq!(c.video_layers()[0].frame.w, 8.0);
    assert!(c.apply_scene_update(&SceneUpdateAtFrame::empty(FrameIndex(1), 1.0)));
    assert_eq!(c.video_layers().len(), 1);
}

#[test]
fn thumbnails_capture_before_and_after_foreground() {
    let mut c = YuvCompositor::with_graphics(
        16,
        8,
        Box::new(StubGraphics),
        CompositorOpts {
            mask_cache_capacity: 4,
            thumbnails: Some(ThumbnailOpts {
                width: 4,
                height: 2,
                interval_frames: 2,
                mode: ThumbnailMode::RawLuma,
            }),
        },
    )
    .unwrap();
    c.set_foreground("{}");
    c.render_frame(FrameIndex(1), &inputs()).unwrap();
    assert!(c.last_thumbnails().is_none());

    c.render_frame(FrameIndex(2), &inputs()).unwrap();
    let pair = c.last_thumbnails().unwrap();
    assert_eq!(pair.frame, FrameIndex(2));
    assert_eq!(pair.before_foreground, Thumbnail::RawLuma(vec![0; 8]));
    assert_eq!(pair.after_foreground, Thumbnail::RawLuma(vec![235; 8]));
}

#[test]
fn render_into_caller_memory() {
    let mut c = compositor(16, 8);
    c.set_video_layers(TWO_LAYERS);
    let layout = Yuv420Layout::dense(16, 8);
    let mut mem = vec![7u8; layout.data_size()];
    let mut dst = Yuv420ViewMut::new(layout, &mut mem).unwrap();
    c.render_frame_into(FrameIndex(0), &inputs(), &mut dst).unwrap();
    assert_eq!(luma(&dst.as_view(), 12, 3), 150);
    assert!(dst.as_view().y().row(7).iter().all(|&v| v != 7));

    let small = Yuv420Layout::dense(8, 8);
    let mut mem = vec![0u8; small.data_size()];
    let mut dst = Yuv420ViewMut::new(small, &mut mem).unwrap();
    assert!(matches!(
        c.render_frame_into(FrameIndex(1), &inputs(), &mut dst),
        Err(YuvcompError::Invariant(_))
    ));
}
