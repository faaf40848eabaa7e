use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::foundation::core::Canvas;
use crate::foundation::error::{YuvcompError, YuvcompResult};

/// Scheduled start of one input slot's playback window.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlaybackEvent {
    /// Output frame at which playback starts.
    pub frame: u64,
    /// Input slot id, matched against video-layer ids.
    pub video_input_id: u32,
    /// Window length in frames.
    pub duration_in_frames: u64,
    /// Editing metadata; accepted and ignored.
    #[allow(dead_code)]
    #[serde(default, rename = "clipId")]
    clip_id: Option<serde_json::Value>,
    /// Directory holding the raw YUV frame sequence.
    pub seq_dir: PathBuf,
    /// Source frame width.
    pub w: u32,
    /// Source frame height.
    pub h: u32,
}

impl PlaybackEvent {
    /// Build an event without editing metadata.
    pub fn new(
        frame: u64,
        video_input_id: u32,
        duration_in_frames: u64,
        seq_dir: impl Into<PathBuf>,
        w: u32,
        h: u32,
    ) -> Self {
        Self {
            frame,
            video_input_id,
            duration_in_frames,
            clip_id: None,
            seq_dir: seq_dir.into(),
            w,
            h,
        }
    }

    /// First frame past the playback window.
    pub fn end_frame(&self) -> u64 {
        self.frame.saturating_add(self.duration_in_frames)
    }
}

/// Timeline of input playback windows.
///
/// ```json
/// {"durationInFrames": 1668, "playbackEvents": [
///   {"frame": 72, "videoInputId": 1001, "durationInFrames": 72, "clipId": "s1",
///    "seqDir": "/tmp/cut/s1", "w": 1280, "h": 720}]}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InputTimings {
    /// Total output length in frames.
    pub duration_in_frames: u64,
    /// First output frame of the timeline.
    #[serde(default)]
    pub start_frame: u64,
    /// Events, ascending by `frame`.
    #[serde(default)]
    pub playback_events: Vec<PlaybackEvent>,
}

impl InputTimings {
    /// Parse timings from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> YuvcompResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| YuvcompError::serde(format!("parse input timings JSON: {e}")))
    }

    /// Parse timings from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> YuvcompResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            YuvcompError::resource(format!("open input timings JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check event ordering and source dimensions.
    ///
    /// The loader consumes events in list order and never re-sorts, so an out-of-order list is
    /// rejected here rather than silently starting slots late.
    pub fn validate(&self) -> YuvcompResult<()> {
        for pair in self.playback_events.windows(2) {
            if pair[1].frame < pair[0].frame {
                return Err(YuvcompError::validation(format!(
                    "playback events must be sorted by frame (input {} at {} follows input {} at {})",
                    pair[1].video_input_id, pair[1].frame, pair[0].video_input_id, pair[0].frame
                )));
            }
        }
        for ev in &self.playback_events {
            Canvas::new(ev.w, ev.h).map_err(|e| {
                YuvcompError::validation(format!("input {} dimensions: {e}", ev.video_input_id))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/timings.rs"]
mod tests;
