use std::collections::HashMap;
use std::f64::consts::{PI, TAU};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use kurbo::{Affine, BezPath, PathEl, Point, Shape, Vec2};

use crate::buffer::alpha::AlphaMask;
use crate::foundation::core::MAX_CANVAS_DIM;
use crate::foundation::error::{YuvcompError, YuvcompResult};
use crate::foundation::math::mul_div255_u16;
use crate::graphics::color::CssColor;
use crate::graphics::display_list::{AssetRef, DisplayList, DrawCommand, LineJoin};
use crate::graphics::{AlphaMode, GraphicsBackend};

const PATH_TOLERANCE: f64 = 0.1;

/// Asset namespace resolved against the resource directory.
pub const DEFAULT_ASSET_KIND: &str = "defaultAsset";

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

#[derive(Clone, Debug)]
struct DrawState {
    transform: Affine,
    fill: CssColor,
    stroke: CssColor,
    line_width: f64,
    line_join: LineJoin,
    global_alpha: f64,
    font: String,
    clip_layers: usize,
}

impl DrawState {
    fn new(base: Affine) -> Self {
        Self {
            transform: base,
            fill: CssColor::BLACK,
            stroke: CssColor::BLACK,
            line_width: 1.0,
            line_join: LineJoin::Miter,
            global_alpha: 1.0,
            font: "10px sans-serif".to_owned(),
            clip_layers: 0,
        }
    }
}

/// Per-list bookkeeping, logged after each render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ExecStats {
    executed: usize,
    skipped: usize,
}

/// CPU rasterizer for display lists and masks, built on `vello_cpu`.
///
/// The render context, target pixmap and decoded images are retained between calls. Text
/// commands are accepted but not drawn.
pub struct CpuGraphics {
    resource_dir: PathBuf,
    ctx: Option<vello_cpu::RenderContext>,
    pixmap: Option<vello_cpu::Pixmap>,
    image_cache: HashMap<String, Option<ImagePaint>>,
}

impl CpuGraphics {
    /// Create a backend that resolves image assets under `resource_dir`.
    pub fn new(resource_dir: impl Into<PathBuf>) -> Self {
        Self {
            resource_dir: resource_dir.into(),
            ctx: None,
            pixmap: None,
            image_cache: HashMap::new(),
        }
    }

    /// Directory image assets are loaded from.
    pub fn resource_dir(&self) -> &Path {
        &self.resource_dir
    }

    fn with_ctx<R>(
        &mut self,
        width: u32,
        height: u32,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> YuvcompResult<R>,
    ) -> YuvcompResult<(R, vello_cpu::Pixmap)> {
        let (w, h) = raster_dims(width, height)?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let out = f(self, &mut ctx);
        let out = match out {
            Ok(out) => out,
            Err(e) => {
                self.ctx = Some(ctx);
                return Err(e);
            }
        };

        let mut pixmap = match self.pixmap.take() {
            Some(p) if p.width() == w && p.height() == h => p,
            _ => vello_cpu::Pixmap::new(w, h),
        };
        pixmap.data_as_u8_slice_mut().fill(0);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);
        Ok((out, pixmap))
    }

    fn execute(
        &mut self,
        dl: &DisplayList,
        width: u32,
        height: u32,
        ctx: &mut vello_cpu::RenderContext,
    ) -> YuvcompResult<ExecStats> {
        let base = if dl.width > 0 && dl.height > 0 && (dl.width != width || dl.height != height)
        {
            Affine::scale_non_uniform(
                f64::from(width) / f64::from(dl.width),
                f64::from(height) / f64::from(dl.height),
            )
        } else {
            Affine::IDENTITY
        };

        let mut state = DrawState::new(base);
        let mut stack: Vec<DrawState> = Vec::new();
        let mut path = BezPath::new();
        let mut stats = ExecStats::default();

        for cmd in &dl.commands {
            let handled = match cmd {
                DrawCommand::Save => {
                    stack.push(state.clone());
                    state.clip_layers = 0;
                    true
                }
                DrawCommand::Restore => {
                    if let Some(prev) = stack.pop() {
                        for _ in 0..state.clip_layers {
                            ctx.pop_layer();
                        }
                        state = prev;
                    }
                    true
                }
                DrawCommand::Scale { x, y } => {
                    state.transform *= Affine::scale_non_uniform(*x, *y);
                    true
                }
                DrawCommand::Rotate { radians } => {
                    state.transform *= Affine::rotate(*radians);
                    true
                }
                DrawCommand::Translate { x, y } => {
                    state.transform *= Affine::translate(Vec2::new(*x, *y));
                    true
                }
                DrawCommand::FillStyle(s) => {
                    state.fill = CssColor::parse(s)?;
                    true
                }
                DrawCommand::StrokeStyle(s) => {
                    state.stroke = CssColor::parse(s)?;
                    true
                }
                DrawCommand::LineWidth(w) => {
                    if w.is_finite() && *w > 0.0 {
                        state.line_width = *w;
                    }
                    true
                }
                DrawCommand::LineJoin(j) => {
                    state.line_join = *j;
                    true
                }
                DrawCommand::GlobalAlpha(a) => {
                    if (0.0..=1.0).contains(a) {
                        state.global_alpha = *a;
                    }
                    true
                }
                DrawCommand::Font(f) => {
                    state.font.clone_from(f);
                    true
                }
                DrawCommand::Fill => {
                    fill_device_path(ctx, &path, &state);
                    true
                }
                DrawCommand::Stroke => {
                    stroke_device_path(ctx, &path, &state);
                    true
                }
                DrawCommand::Clip => {
                    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.push_clip_layer(&bezpath_to_cpu(&path));
                    state.clip_layers += 1;
                    true
                }
                DrawCommand::FillRect { x, y, w, h } => {
                    let rect = kurbo::Rect::new(*x, *y, x + w, y + h).to_path(PATH_TOLERANCE);
                    fill_device_path(ctx, &(state.transform * rect), &state);
                    true
                }
                DrawCommand::StrokeRect { x, y, w, h } => {
                    let rect = kurbo::Rect::new(*x, *y, x + w, y + h).to_path(PATH_TOLERANCE);
                    stroke_device_path(ctx, &(state.transform * rect), &state);
                    true
                }
                DrawCommand::Rect { x, y, w, h } => {
                    let t = state.transform;
                    path.move_to(t * Point::new(*x, *y));
                    path.line_to(t * Point::new(x + w, *y));
                    path.line_to(t * Point::new(x + w, y + h));
                    path.line_to(t * Point::new(*x, y + h));
                    path.close_path();
                    path.move_to(t * Point::new(*x, *y));
                    true
                }
                DrawCommand::RoundRect { x, y, w, h, radius } => {
                    let r = radius.max(0.0).min(w.abs().min(h.abs()) / 2.0);
                    let rr = kurbo::RoundedRect::new(*x, *y, x + w, y + h, r).to_path(PATH_TOLERANCE);
                    path.extend((state.transform * rr).elements().iter().copied());
                    true
                }
                DrawCommand::FillText { text, .. } | DrawCommand::StrokeText { text, .. } => {
                    tracing::debug!(font = %state.font, text = %text, "text drawing not supported, skipped");
                    false
                }
                DrawCommand::DrawImage { asset, x, y, w, h } => {
                    self.draw_image(ctx, &state, asset, *x, *y, *w, *h)
                }
                DrawCommand::BeginPath => {
                    path = BezPath::new();
                    true
                }
                DrawCommand::ClosePath => {
                    if current_point(&path).is_some() {
                        path.close_path();
                    }
                    true
                }
                DrawCommand::MoveTo { x, y } => {
                    path.move_to(state.transform * Point::new(*x, *y));
                    true
                }
                DrawCommand::LineTo { x, y } => {
                    let p = state.transform * Point::new(*x, *y);
                    if current_point(&path).is_some() {
                        path.line_to(p);
                    } else {
                        path.move_to(p);
                    }
                    true
                }
                DrawCommand::QuadraticCurveTo { cpx, cpy, x, y } => {
                    let cp = state.transform * Point::new(*cpx, *cpy);
                    if current_point(&path).is_none() {
                        path.move_to(cp);
                    }
                    path.quad_to(cp, state.transform * Point::new(*x, *y));
                    true
                }
                DrawCommand::ArcTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    radius,
                } => {
                    arc_to(
                        &mut path,
                        state.transform,
                        Point::new(*x1, *y1),
                        Point::new(*x2, *y2),
                        *radius,
                    );
                    true
                }
                DrawCommand::Ellipse {
                    x,
                    y,
                    rx,
                    ry,
                    rotation,
                    start,
                    end,
                    ccw,
                } => {
                    let sweep = canvas_sweep(*start, *end, *ccw);
                    let arc = kurbo::Arc {
                        center: Point::new(*x, *y),
                        radii: Vec2::new(*rx, *ry),
                        start_angle: *start,
                        sweep_angle: sweep,
                        x_rotation: *rotation,
                    };
                    append_arc(&mut path, state.transform, &arc);
                    true
                }
            };
            if handled {
                stats.executed += 1;
            } else {
                stats.skipped += 1;
            }
        }

        let open_layers = state.clip_layers + stack.iter().map(|s| s.clip_layers).sum::<usize>();
        for _ in 0..open_layers {
            ctx.pop_layer();
        }
        Ok(stats)
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_image(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        state: &DrawState,
        asset: &AssetRef,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    ) -> bool {
        if asset.kind != DEFAULT_ASSET_KIND {
            tracing::debug!(kind = %asset.kind, id = %asset.id, "unsupported image asset type");
            return false;
        }
        let Some(img) = self.image_paint_for(&asset.id) else {
            return false;
        };

        let (iw, ih) = (f64::from(img.w), f64::from(img.h));
        let t = state.transform
            * Affine::translate(Vec2::new(x, y))
            * Affine::scale_non_uniform(w / iw, h / ih);
        ctx.set_transform(affine_to_cpu(t));
        ctx.set_paint(img.paint);
        let alpha = state.global_alpha as f32;
        if alpha < 1.0 {
            ctx.push_opacity_layer(alpha);
        }
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
        if alpha < 1.0 {
            ctx.pop_layer();
        }
        true
    }

    fn image_paint_for(&mut self, id: &str) -> Option<ImagePaint> {
        if let Some(cached) = self.image_cache.get(id) {
            return cached.clone();
        }
        let loaded = match self.load_image(id) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "failed to load image asset");
                None
            }
        };
        self.image_cache.insert(id.to_owned(), loaded.clone());
        loaded
    }

    fn load_image(&self, id: &str) -> YuvcompResult<ImagePaint> {
        let rel = Path::new(id);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(YuvcompError::validation(format!(
                "image asset id must be a relative path without '..': \"{id}\""
            )));
        }
        let path = self.resource_dir.join(rel);
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read image asset '{}'", path.display()))?;
        let rgba = image::load_from_memory(&bytes)
            .context("decode image from memory")?
            .to_rgba8();
        let (w, h) = rgba.dimensions();
        let (pw, ph) = raster_dims(w, h)?;

        let pixels = rgba
            .into_raw()
            .chunks_exact(4)
            .map(|px| {
                let a = u16::from(px[3]);
                vello_cpu::peniko::color::PremulRgba8::from_u8_array([
                    mul_div255_u16(u16::from(px[0]), a) as u8,
                    mul_div255_u16(u16::from(px[1]), a) as u8,
                    mul_div255_u16(u16::from(px[2]), a) as u8,
                    px[3],
                ])
            })
            .collect::<Vec<_>>();
        let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, pw, ph, true);
        Ok(ImagePaint {
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            w,
            h,
        })
    }
}

impl GraphicsBackend for CpuGraphics {
    #[tracing::instrument(skip(self, json, dst))]
    fn render_display_list(
        &mut self,
        json: &str,
        dst: &mut [u8],
        width: u32,
        height: u32,
        row_bytes: usize,
        alpha_mode: AlphaMode,
    ) -> YuvcompResult<()> {
        check_rgba_target(dst.len(), width, height, row_bytes)?;
        let dl = DisplayList::parse(json)?;

        let (stats, pixmap) =
            self.with_ctx(width, height, |this, ctx| this.execute(&dl, width, height, ctx))?;
        tracing::debug!(
            executed = stats.executed,
            skipped = stats.skipped,
            invalid = dl.invalid_commands,
            "display list rendered"
        );

        let src = pixmap.data_as_u8_slice();
        let packed = width as usize * 4;
        for (y, src_row) in src.chunks_exact(packed).enumerate() {
            let out = &mut dst[y * row_bytes..y * row_bytes + packed];
            out.copy_from_slice(src_row);
            if alpha_mode == AlphaMode::Unpremultiplied {
                unpremultiply_in_place(out);
            }
        }
        self.pixmap = Some(pixmap);
        Ok(())
    }

    fn render_rounded_rect_mask(
        &mut self,
        width: u32,
        height: u32,
        radius: f64,
    ) -> YuvcompResult<AlphaMask> {
        let (w, h) = (f64::from(width), f64::from(height));
        let r = if radius.is_finite() {
            radius.clamp(0.0, w.min(h) / 2.0)
        } else {
            0.0
        };
        let shape = kurbo::RoundedRect::new(0.0, 0.0, w, h, r).to_path(PATH_TOLERANCE);

        let ((), pixmap) = self.with_ctx(width, height, |_, ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
            ctx.fill_path(&bezpath_to_cpu(&shape));
            Ok(())
        })?;

        let mut mask = AlphaMask::new(width, height);
        let src = pixmap.data_as_u8_slice();
        for y in 0..height {
            let src_row = &src[y as usize * width as usize * 4..][..width as usize * 4];
            for (m, px) in mask.row_mut(y).iter_mut().zip(src_row.chunks_exact(4)) {
                *m = px[3];
            }
        }
        self.pixmap = Some(pixmap);
        Ok(mask)
    }
}

fn raster_dims(width: u32, height: u32) -> YuvcompResult<(u16, u16)> {
    if width == 0 || height == 0 || width > MAX_CANVAS_DIM || height > MAX_CANVAS_DIM {
        return Err(YuvcompError::graphics(format!(
            "raster size {width}x{height} outside 1..={MAX_CANVAS_DIM}"
        )));
    }
    let w = u16::try_from(width).map_err(|_| YuvcompError::graphics("raster width too large"))?;
    let h =
        u16::try_from(height).map_err(|_| YuvcompError::graphics("raster height too large"))?;
    Ok((w, h))
}

fn check_rgba_target(len: usize, width: u32, height: u32, row_bytes: usize) -> YuvcompResult<()> {
    let packed = width as usize * 4;
    if row_bytes < packed {
        return Err(YuvcompError::invariant(format!(
            "row bytes {row_bytes} smaller than {packed}"
        )));
    }
    let needed = row_bytes * (height as usize).saturating_sub(1) + packed;
    if len < needed {
        return Err(YuvcompError::invariant(format!(
            "rgba target holds {len} bytes, needs {needed}"
        )));
    }
    Ok(())
}

fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

fn paint_color(ctx: &mut vello_cpu::RenderContext, color: CssColor, global_alpha: f64) {
    let [r, g, b, a] = color.to_rgba8(global_alpha);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
}

fn fill_device_path(ctx: &mut vello_cpu::RenderContext, path: &BezPath, state: &DrawState) {
    if path.elements().is_empty() {
        return;
    }
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    paint_color(ctx, state.fill, state.global_alpha);
    ctx.fill_path(&bezpath_to_cpu(path));
}

fn stroke_device_path(ctx: &mut vello_cpu::RenderContext, path: &BezPath, state: &DrawState) {
    if path.elements().is_empty() {
        return;
    }
    let [a, b, c, d, _, _] = state.transform.as_coeffs();
    let scale = (a * d - b * c).abs().sqrt();
    let join = match state.line_join {
        LineJoin::Miter => vello_cpu::kurbo::Join::Miter,
        LineJoin::Bevel => vello_cpu::kurbo::Join::Bevel,
        LineJoin::Round => vello_cpu::kurbo::Join::Round,
    };
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(state.line_width * scale).with_join(join));
    paint_color(ctx, state.stroke, state.global_alpha);
    ctx.stroke_path(&bezpath_to_cpu(path));
}

fn current_point(path: &BezPath) -> Option<Point> {
    let mut start = None;
    let mut cur = None;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                start = Some(p);
                cur = Some(p);
            }
            PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => cur = Some(p),
            PathEl::ClosePath => cur = start,
        }
    }
    cur
}

fn canvas_sweep(start: f64, end: f64, ccw: bool) -> f64 {
    if !ccw {
        let d = end - start;
        if d >= TAU { TAU } else { d.rem_euclid(TAU) }
    } else {
        let d = start - end;
        if d >= TAU { -TAU } else { -d.rem_euclid(TAU) }
    }
}

fn append_arc(path: &mut BezPath, t: Affine, arc: &kurbo::Arc) {
    let (sin, cos) = arc.start_angle.sin_cos();
    let (rot_sin, rot_cos) = arc.x_rotation.sin_cos();
    let (lx, ly) = (arc.radii.x * cos, arc.radii.y * sin);
    let start = t * (arc.center + Vec2::new(lx * rot_cos - ly * rot_sin, lx * rot_sin + ly * rot_cos));
    if current_point(path).is_some() {
        path.line_to(start);
    } else {
        path.move_to(start);
    }
    for el in arc.append_iter(PATH_TOLERANCE) {
        path.push(t * el);
    }
}

fn arc_to(path: &mut BezPath, t: Affine, p1: Point, p2: Point, radius: f64) {
    let dev_p1 = t * p1;
    let Some(dev_p0) = current_point(path) else {
        path.move_to(dev_p1);
        return;
    };
    let p0 = t.inverse() * dev_p0;

    let v1 = p0 - p1;
    let v2 = p2 - p1;
    let (l1, l2) = (v1.hypot(), v2.hypot());
    let cross = v1.cross(v2);
    if radius <= 0.0 || l1 < 1e-9 || l2 < 1e-9 || cross.abs() < 1e-9 {
        path.line_to(dev_p1);
        return;
    }

    let (u1, u2) = (v1 / l1, v2 / l2);
    let theta = u1.dot(u2).clamp(-1.0, 1.0).acos();
    let tangent = radius / (theta / 2.0).tan();
    let t1 = p1 + u1 * tangent;
    let t2 = p1 + u2 * tangent;
    let bisector = (u1 + u2).normalize();
    let center = p1 + bisector * (radius / (theta / 2.0).sin());

    let a0 = (t1 - center).atan2();
    let a1 = (t2 - center).atan2();
    let mut sweep = a1 - a0;
    while sweep > PI {
        sweep -= TAU;
    }
    while sweep < -PI {
        sweep += TAU;
    }
    let arc = kurbo::Arc {
        center,
        radii: Vec2::new(radius, radius),
        start_angle: a0,
        sweep_angle: sweep,
        x_rotation: 0.0,
    };
    append_arc(path, t, &arc);
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let pt = |p: Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/graphics/cpu.rs"]
mod tests;
