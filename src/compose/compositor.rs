use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::buffer::yuv::{AsYuv420View, Yuv420Buf, Yuv420View, Yuv420ViewMut};
use crate::compose::foreground::ForegroundBlender;
use crate::compose::layer::{CopyMode, LayerCompositor};
use crate::compose::mask_cache::{DEFAULT_MASK_CACHE_CAPACITY, MaskCache, MaskCacheStats, MaskKey};
use crate::compose::thumbs::{ThumbnailOpts, ThumbnailPair, render_thumbnail};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{YuvcompError, YuvcompResult};
use crate::foundation::math::lround;
use crate::graphics::{CpuGraphics, GraphicsBackend};
use crate::pixel::scale::copy_plane;
use crate::scene::sequencer::SceneUpdateAtFrame;
use crate::scene::video_layers::{VideoLayerDescriptor, parse_video_layers};

/// Environment variable overriding [`CompositorOpts::mask_cache_capacity`].
pub const MASK_CACHE_CAPACITY_ENV: &str = "YUVCOMP_MASK_CACHE_CAPACITY";

/// Compositor configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositorOpts {
    /// Distinct rounded-corner masks kept before FIFO eviction.
    pub mask_cache_capacity: usize,
    /// Thumbnail capture; `None` disables it.
    pub thumbnails: Option<ThumbnailOpts>,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            mask_cache_capacity: DEFAULT_MASK_CACHE_CAPACITY,
            thumbnails: None,
        }
    }
}

impl CompositorOpts {
    /// Defaults with the mask cache capacity taken from [`MASK_CACHE_CAPACITY_ENV`] when it
    /// holds a positive integer.
    pub fn from_env() -> Self {
        let var = std::env::var(MASK_CACHE_CAPACITY_ENV).ok();
        Self {
            mask_cache_capacity: mask_cache_capacity_from(var.as_deref()),
            ..Self::default()
        }
    }
}

fn mask_cache_capacity_from(value: Option<&str>) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_MASK_CACHE_CAPACITY)
}

/// Multi-layer YUV 4:2:0 compositor.
///
/// Each frame clears the retained composite, draws the current video-layer list in order and
/// blends the foreground overlay on top. Layer lists and foreground display lists persist
/// until replaced, so callers only push changes.
pub struct YuvCompositor {
    canvas: Canvas,
    opts: CompositorOpts,
    graphics: Box<dyn GraphicsBackend>,
    composite: Yuv420Buf,
    layers: Vec<VideoLayerDescriptor>,
    layer_compositor: LayerCompositor,
    masks: MaskCache,
    foreground: ForegroundBlender,
    last_thumbnails: Option<ThumbnailPair>,
}

impl YuvCompositor {
    /// Create a `width x height` compositor whose foreground images resolve under `resource_dir`.
    pub fn new(
        width: u32,
        height: u32,
        resource_dir: impl Into<PathBuf>,
        opts: CompositorOpts,
    ) -> YuvcompResult<Self> {
        Self::with_graphics(width, height, Box::new(CpuGraphics::new(resource_dir)), opts)
    }

    /// Create a compositor that rasterizes through `graphics`.
    pub fn with_graphics(
        width: u32,
        height: u32,
        graphics: Box<dyn GraphicsBackend>,
        opts: CompositorOpts,
    ) -> YuvcompResult<Self> {
        let canvas = Canvas::new(width, height)?;
        let mut composite = Yuv420Buf::new_padded(width, height);
        composite.clear_to_neutral();
        Ok(Self {
            canvas,
            masks: MaskCache::new(opts.mask_cache_capacity),
            opts,
            graphics,
            composite,
            layers: Vec::new(),
            layer_compositor: LayerCompositor::new(),
            foreground: ForegroundBlender::new(width, height),
            last_thumbnails: None,
        })
    }

    /// Output size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Active configuration.
    pub fn opts(&self) -> &CompositorOpts {
        &self.opts
    }

    /// Current video-layer list, in draw order.
    pub fn video_layers(&self) -> &[VideoLayerDescriptor] {
        &self.layers
    }

    /// Parse `json` and replace the layer list; on error the previous list is kept.
    pub fn try_set_video_layers(&mut self, json: &str, layer_scale: f64) -> YuvcompResult<()> {
        self.layers = parse_video_layers(json, layer_scale)?;
        tracing::debug!(layers = self.layers.len(), "video layers updated");
        Ok(())
    }

    /// [`YuvCompositor::try_set_video_layers`] at scale 1, logging failures.
    pub fn set_video_layers(&mut self, json: &str) -> bool {
        self.set_video_layers_scaled(json, 1.0)
    }

    /// [`YuvCompositor::try_set_video_layers`], logging failures and returning success.
    pub fn set_video_layers_scaled(&mut self, json: &str, layer_scale: f64) -> bool {
        match self.try_set_video_layers(json, layer_scale) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "rejected video layer update; keeping previous layers");
                false
            }
        }
    }

    /// Store a foreground display list, rasterized lazily by the next render.
    ///
    /// Always returns `true`; render-time failures are logged and keep the previous overlay.
    pub fn set_foreground(&mut self, json: &str) -> bool {
        self.foreground.set_json(json);
        true
    }

    /// Replace the foreground with a premultiplied RGBA raster of the output size.
    pub fn set_foreground_rgba(&mut self, rgba: &[u8]) -> YuvcompResult<()> {
        self.foreground.set_rgba(rgba)
    }

    /// Apply whatever a scene update carries; returns `false` if the layer list was rejected.
    pub fn apply_scene_update(&mut self, update: &SceneUpdateAtFrame) -> bool {
        let mut ok = true;
        if let Some(json) = &update.video_layers_json {
            ok = self.set_video_layers_scaled(json, update.layer_scale);
        }
        if let Some(json) = &update.foreground_json {
            self.set_foreground(json);
        }
        ok
    }

    /// Mask cache counters.
    pub fn mask_cache_stats(&self) -> MaskCacheStats {
        self.masks.stats()
    }

    /// Before/after-foreground thumbnails of the most recent capture.
    pub fn last_thumbnails(&self) -> Option<&ThumbnailPair> {
        self.last_thumbnails.as_ref()
    }

    /// Composite one frame.
    ///
    /// Layers whose input id is absent from `inputs` are skipped. The returned view aliases the
    /// retained composite and is only valid until the next call.
    #[tracing::instrument(skip(self, inputs), fields(frame = frame.0, inputs = inputs.len()))]
    pub fn render_frame<B: AsYuv420View>(
        &mut self,
        frame: FrameIndex,
        inputs: &BTreeMap<u32, B>,
    ) -> YuvcompResult<Yuv420View<'_>> {
        if let Err(e) = self.foreground.prepare(self.graphics.as_mut()) {
            tracing::warn!(error = %e, "foreground render failed; keeping previous overlay");
        }

        self.composite.clear_to_neutral();
        for (i, layer) in self.layers.iter().enumerate() {
            let Some(input) = inputs.get(&layer.id) else {
                tracing::debug!(id = layer.id, index = i, "no input for video layer");
                continue;
            };
            let src = input.as_yuv420_view();
            let mask = if layer.corner_radius_px > 0.0 {
                LayerCompositor::box_size(src.width(), src.height(), layer).and_then(|(w, h)| {
                    let key = MaskKey {
                        width: w,
                        height: h,
                        radius: lround(layer.corner_radius_px).clamp(0, i64::from(u32::MAX)) as u32,
                    };
                    self.masks
                        .get_mask(key, self.graphics.as_mut())
                        .map_err(|e| {
                            tracing::warn!(id = layer.id, error = %e, "mask unavailable; drawing square corners");
                        })
                        .ok()
                })
            } else {
                None
            };
            let copy = match mask.as_deref() {
                Some(m) => CopyMode::Masked(m),
                None => CopyMode::Opaque,
            };
            self.layer_compositor
                .draw_layer(src, layer, copy, &mut self.composite.view_mut());
        }

        let thumbs = self.opts.thumbnails.filter(|t| t.captures_at(frame));
        let before = thumbs.map(|t| render_thumbnail(&t, self.composite.view()));

        self.foreground.blend_onto(&mut self.composite.view_mut())?;

        if let (Some(t), Some(before)) = (thumbs, before) {
            self.last_thumbnails = Some(ThumbnailPair {
                frame,
                before_foreground: before,
                after_foreground: render_thumbnail(&t, self.composite.view()),
            });
        }
        Ok(self.composite.view())
    }

    /// Composite one frame and copy it into caller-owned memory of any row stride.
    pub fn render_frame_into<B: AsYuv420View>(
        &mut self,
        frame: FrameIndex,
        inputs: &BTreeMap<u32, B>,
        dst: &mut Yuv420ViewMut<'_>,
    ) -> YuvcompResult<()> {
        let layout = dst.layout();
        if layout.width != self.canvas.width || layout.height != self.canvas.height {
            return Err(YuvcompError::invariant(format!(
                "output buffer is {}x{} but compositor is {}x{}",
                layout.width, layout.height, self.canvas.width, self.canvas.height
            )));
        }
        let src = self.render_frame(frame, inputs)?;
        for (s, d) in src.planes().into_iter().zip(dst.planes_mut().iter_mut()) {
            copy_plane(s, d);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
