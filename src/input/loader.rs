use std::collections::BTreeMap;

use crate::buffer::yuv::Yuv420Buf;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{YuvcompError, YuvcompResult};
use crate::input::image_seq::ImageSequence;
use crate::scene::timings::{InputTimings, PlaybackEvent};

/// Input buffers available at one output frame, keyed by input slot id.
pub type InputBufsById = BTreeMap<u32, Yuv420Buf>;

#[derive(Debug)]
struct ActivePlayback {
    seq: ImageSequence,
    start: u64,
    duration: u64,
}

/// Drives playback windows over a monotonically increasing frame index.
///
/// Events are consumed in list order through a cursor; they must already be sorted by frame.
#[derive(Debug)]
pub struct VideoInputLoader {
    events: Vec<PlaybackEvent>,
    event_cursor: usize,
    last_frame: u64,
    active: BTreeMap<u32, ActivePlayback>,
}

impl VideoInputLoader {
    /// Loader over the playback events of `timings`.
    pub fn new(timings: &InputTimings) -> Self {
        Self::from_events(timings.playback_events.clone())
    }

    /// Loader over `events`, which must be ascending by frame.
    pub fn from_events(events: Vec<PlaybackEvent>) -> Self {
        Self {
            events,
            event_cursor: 0,
            last_frame: 0,
            active: BTreeMap::new(),
        }
    }

    /// Rewind to the start of the timeline, dropping every active playback.
    pub fn start(&mut self) {
        self.event_cursor = 0;
        self.last_frame = 0;
        self.active.clear();
    }

    /// Input ids currently inside their playback window.
    pub fn active_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.active.keys().copied()
    }

    /// Advance to `frame` and read one buffer per active input.
    ///
    /// Frames must be requested in non-decreasing order; going backwards is an
    /// [`YuvcompError::Invariant`]. A failed sequence open or frame read is returned as is.
    #[tracing::instrument(skip(self), fields(frame = frame.0))]
    pub fn read_input_bufs_at_frame(&mut self, frame: FrameIndex) -> YuvcompResult<InputBufsById> {
        let f = frame.0;
        if f < self.last_frame {
            return Err(YuvcompError::invariant(format!(
                "input frames must be requested in order (got {f} after {})",
                self.last_frame
            )));
        }
        self.last_frame = f;

        while let Some(ev) = self.events.get(self.event_cursor) {
            if ev.frame > f {
                break;
            }
            tracing::debug!(
                input = ev.video_input_id,
                event = self.event_cursor,
                seq_dir = %ev.seq_dir.display(),
                "starting playback"
            );
            let seq = ImageSequence::open(&ev.seq_dir, ev.w, ev.h)?;
            self.active.insert(
                ev.video_input_id,
                ActivePlayback {
                    seq,
                    start: ev.frame,
                    duration: ev.duration_in_frames,
                },
            );
            self.event_cursor += 1;
        }

        let mut bufs = InputBufsById::new();
        let mut ended = Vec::new();
        for (&id, playback) in &self.active {
            if f >= playback.start.saturating_add(playback.duration) {
                ended.push(id);
                continue;
            }
            bufs.insert(id, playback.seq.read_frame(f - playback.start)?);
        }
        for id in ended {
            tracing::debug!(input = id, frame = f, "playback ended");
            self.active.remove(&id);
        }
        Ok(bufs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/loader.rs"]
mod tests;
