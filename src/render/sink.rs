use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::buffer::yuv::{Yuv420Buf, Yuv420View};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{YuvcompError, YuvcompResult};

/// Default file-name prefix for [`YuvFileSink`].
pub const DEFAULT_OUTPUT_PREFIX: &str = "yuvcomp_out";

/// Configuration provided to a [`FrameSink`] at the start of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Frames the batch will push unless interrupted.
    pub frames_total: u64,
}

/// Consumer of composited frames.
///
/// `push_frame` is called in strictly increasing [`FrameIndex`] order. The view is only valid for
/// the duration of the call.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> YuvcompResult<()>;
    /// Consume one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: Yuv420View<'_>) -> YuvcompResult<()>;
    /// Called once after the last frame, including after an interruption.
    fn end(&mut self) -> YuvcompResult<()>;
}

/// Writes each frame to `<dir>/<prefix>_NNNN.yuv` with dense rows, planes in Y, Cr, Cb order.
#[derive(Debug)]
pub struct YuvFileSink {
    dir: PathBuf,
    prefix: String,
    written: Vec<PathBuf>,
}

impl YuvFileSink {
    /// Sink writing into `dir`, created on [`FrameSink::begin`] if missing.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            written: Vec::new(),
        }
    }

    /// Output path for `idx`.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("{}_{:04}.yuv", self.prefix, idx.0))
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in push order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for YuvFileSink {
    fn begin(&mut self, _cfg: SinkConfig) -> YuvcompResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            YuvcompError::resource(format!("create output dir '{}': {e}", self.dir.display()))
        })?;
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: Yuv420View<'_>) -> YuvcompResult<()> {
        let path = self.frame_path(idx);
        let write = || -> std::io::Result<()> {
            let mut w = BufWriter::new(File::create(&path)?);
            frame.write_dense(&mut w)?;
            std::io::Write::flush(&mut w)
        };
        write().map_err(|e| {
            YuvcompError::resource(format!("write frame '{}': {e}", path.display()))
        })?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> YuvcompResult<()> {
        tracing::debug!(frames = self.written.len(), dir = %self.dir.display(), "output files written");
        Ok(())
    }
}

/// In-memory sink for tests and debugging. Frames are stored with dense rows.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, Yuv420Buf)>,
    ended: bool,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, Yuv420Buf)] {
        &self.frames
    }

    /// Return `true` once `end` has been called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> YuvcompResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: Yuv420View<'_>) -> YuvcompResult<()> {
        self.frames.push((idx, frame.to_dense()));
        Ok(())
    }

    fn end(&mut self) -> YuvcompResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/sink.rs"]
mod tests;
