use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::compose::compositor::YuvCompositor;
use crate::compose::thumbs::{Thumbnail, ThumbnailPair};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{YuvcompError, YuvcompResult};
use crate::input::loader::VideoInputLoader;
use crate::render::sink::{DEFAULT_OUTPUT_PREFIX, FrameSink, SinkConfig};
use crate::scene::sequencer::{SceneSequencer, SceneUpdateAtFrame};
use crate::scene::timings::InputTimings;

/// Source of sparse scene updates for the batch loop.
pub trait SceneSource {
    /// Update recorded for `frame`, if any. Called once per frame in increasing order.
    fn update_at(&mut self, frame: FrameIndex) -> YuvcompResult<Option<SceneUpdateAtFrame>>;
}

impl SceneSource for SceneSequencer {
    fn update_at(&mut self, frame: FrameIndex) -> YuvcompResult<Option<SceneUpdateAtFrame>> {
        let update = self.read_at_frame(frame)?;
        Ok((!update.is_empty()).then_some(update))
    }
}

/// Pre-loaded updates, ascending by frame, consumed through a cursor.
#[derive(Debug, Default)]
pub struct ScriptedScenes {
    updates: Vec<SceneUpdateAtFrame>,
    cursor: usize,
}

impl ScriptedScenes {
    /// Wrap `updates`, sorting them by frame.
    pub fn new(mut updates: Vec<SceneUpdateAtFrame>) -> Self {
        updates.sort_by_key(|u| u.index);
        Self { updates, cursor: 0 }
    }
}

impl SceneSource for ScriptedScenes {
    fn update_at(&mut self, frame: FrameIndex) -> YuvcompResult<Option<SceneUpdateAtFrame>> {
        while let Some(u) = self.updates.get(self.cursor) {
            if u.index > frame {
                break;
            }
            self.cursor += 1;
            if u.index == frame {
                return Ok(Some(u.clone()));
            }
        }
        Ok(None)
    }
}

/// Batch loop settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchOpts {
    /// Directory for captured thumbnails; `None` keeps them in memory only.
    pub thumb_dir: Option<PathBuf>,
    /// Prefix for thumbnail file names.
    pub thumb_prefix: String,
}

impl Default for BatchOpts {
    fn default() -> Self {
        Self {
            thumb_dir: None,
            thumb_prefix: DEFAULT_OUTPUT_PREFIX.to_owned(),
        }
    }
}

/// Summary of a batch run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BatchStats {
    /// Frames in the timeline.
    pub frames_total: u64,
    /// Frames composited and pushed to the sink.
    pub frames_rendered: u64,
    /// Scene updates whose layer list was rejected.
    pub rejected_updates: u64,
    /// Thumbnail pairs captured.
    pub thumbnails: u64,
    /// Set when the interrupt flag stopped the loop early.
    pub interrupted: bool,
    /// Mean composite time in milliseconds, excluding the first (warm-up) frame when possible.
    pub mean_render_ms: f64,
}

/// Drives a [`YuvCompositor`] over an input timeline and hands each frame to a [`FrameSink`].
pub struct BatchRenderer {
    compositor: YuvCompositor,
    loader: VideoInputLoader,
    range: FrameRange,
    scenes: Option<Box<dyn SceneSource>>,
    opts: BatchOpts,
    interrupt: Arc<AtomicBool>,
}

impl BatchRenderer {
    /// Renderer over `[start_frame, start_frame + duration_in_frames)` of `timings`.
    pub fn new(
        compositor: YuvCompositor,
        timings: &InputTimings,
        opts: BatchOpts,
    ) -> YuvcompResult<Self> {
        timings.validate()?;
        let end = timings
            .start_frame
            .checked_add(timings.duration_in_frames)
            .ok_or_else(|| YuvcompError::validation("timeline end overflows"))?;
        let range = FrameRange::new(FrameIndex(timings.start_frame), FrameIndex(end))?;
        Ok(Self {
            compositor,
            loader: VideoInputLoader::new(timings),
            range,
            scenes: None,
            opts,
            interrupt: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Apply scene updates from `scenes` as their frames are reached.
    pub fn with_scenes(mut self, scenes: impl SceneSource + 'static) -> Self {
        self.scenes = Some(Box::new(scenes));
        self
    }

    /// Use an externally owned interrupt flag.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = flag;
        self
    }

    /// Flag that stops the loop before the next frame once set.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Frames the loop will visit.
    pub fn range(&self) -> FrameRange {
        self.range
    }

    /// The wrapped compositor.
    pub fn compositor(&self) -> &YuvCompositor {
        &self.compositor
    }

    /// Render every frame of the range into `sink`.
    ///
    /// Input read failures and sink errors abort the run. `sink.end()` is still called when the
    /// interrupt flag stops the loop.
    #[tracing::instrument(skip_all, fields(start = self.range.start.0, end = self.range.end.0))]
    pub fn run(&mut self, sink: &mut dyn FrameSink) -> YuvcompResult<BatchStats> {
        let canvas = self.compositor.canvas();
        let mut stats = BatchStats {
            frames_total: self.range.len_frames(),
            ..BatchStats::default()
        };
        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            frames_total: stats.frames_total,
        })?;
        self.loader.start();

        // The first frame warms caches and is left out of the mean once a second one exists.
        let mut first_ms = None;
        let (mut sum_ms, mut timed) = (0.0f64, 0u64);
        for frame in self.range.iter() {
            if self.interrupt.load(Ordering::Relaxed) {
                tracing::info!(frame = frame.0, "interrupted");
                stats.interrupted = true;
                break;
            }

            if let Some(scenes) = self.scenes.as_mut()
                && let Some(update) = scenes.update_at(frame)?
            {
                tracing::debug!(frame = frame.0, "applying scene update");
                if !self.compositor.apply_scene_update(&update) {
                    stats.rejected_updates += 1;
                }
            }

            let inputs = self.loader.read_input_bufs_at_frame(frame)?;

            let t0 = Instant::now();
            let out = self.compositor.render_frame(frame, &inputs)?;
            let ms = t0.elapsed().as_secs_f64() * 1000.0;
            if first_ms.is_none() {
                first_ms = Some(ms);
            } else {
                sum_ms += ms;
                timed += 1;
            }

            sink.push_frame(frame, out)?;
            stats.frames_rendered += 1;

            if let Some(pair) = self.compositor.last_thumbnails()
                && pair.frame == frame
            {
                stats.thumbnails += 1;
                if let Some(dir) = &self.opts.thumb_dir {
                    write_thumbnails(dir, &self.opts.thumb_prefix, pair)?;
                }
            }
        }
        sink.end()?;

        stats.mean_render_ms = match (timed, first_ms) {
            (0, Some(ms)) => ms,
            (0, None) => 0.0,
            (n, _) => sum_ms / n as f64,
        };
        tracing::info!(
            frames = stats.frames_rendered,
            mean_render_ms = stats.mean_render_ms,
            interrupted = stats.interrupted,
            "batch finished"
        );
        Ok(stats)
    }
}

fn thumbnail_ext(t: &Thumbnail) -> &'static str {
    match t {
        Thumbnail::RawLuma(_) => "raw",
        Thumbnail::Ascii(_) => "txt",
    }
}

fn write_thumbnails(dir: &std::path::Path, prefix: &str, pair: &ThumbnailPair) -> YuvcompResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        YuvcompError::resource(format!("create thumbnail dir '{}': {e}", dir.display()))
    })?;
    for (stage, thumb) in [
        ("before", &pair.before_foreground),
        ("after", &pair.after_foreground),
    ] {
        let path = dir.join(format!(
            "{prefix}_thumb_{:04}_{stage}.{}",
            pair.frame.0,
            thumbnail_ext(thumb)
        ));
        std::fs::write(&path, thumb.as_bytes()).map_err(|e| {
            YuvcompError::resource(format!("write thumbnail '{}': {e}", path.display()))
        })?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/batch.rs"]
mod tests;
