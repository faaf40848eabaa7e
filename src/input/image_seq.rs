use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::buffer::yuv::{Yuv420Buf, Yuv420Layout};
use crate::foundation::core::Canvas;
use crate::foundation::error::{YuvcompError, YuvcompResult};
use crate::input::fileseq::{SeqPattern, list_files_with_ext};

/// Upper bound on frames discovered by probing.
pub const PROBE_LIMIT: u64 = 10_000;

const RAW_YUV_EXT: &str = "yuv";

/// Directory of raw dense YUV 4:2:0 frames (`name_0000.yuv`, `name_0001.yuv`, ...).
///
/// Frame numbering may start at 0 or 1. Reads past the end wrap around, so the sequence loops.
#[derive(Debug)]
pub struct ImageSequence {
    dir: PathBuf,
    pattern: SeqPattern,
    layout: Yuv420Layout,
    frame_count: u64,
    first_index: u64,
}

impl ImageSequence {
    /// Discover the sequence in `dir`; frames are `width x height` with dense rows.
    #[tracing::instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn open(dir: impl AsRef<Path>, width: u32, height: u32) -> YuvcompResult<Self> {
        let dir = dir.as_ref();
        Canvas::new(width, height)?;
        let files = list_files_with_ext(dir, RAW_YUV_EXT)?;
        let first = files.first().ok_or_else(|| {
            YuvcompError::resource(format!("no .{RAW_YUV_EXT} files in '{}'", dir.display()))
        })?;
        let pattern = SeqPattern::from_path(first)?;

        let probe = |start: u64| {
            (0..PROBE_LIMIT)
                .take_while(|n| dir.join(pattern.file_name(start + n)).is_file())
                .count() as u64
        };
        let (first_index, frame_count) = match probe(0) {
            0 => (1, probe(1)),
            n => (0, n),
        };
        if frame_count == 0 {
            return Err(YuvcompError::resource(format!(
                "no frame 0 or 1 for pattern '{}' in '{}'",
                pattern.file_name(0),
                dir.display()
            )));
        }
        tracing::debug!(
            prefix = %pattern.prefix,
            digits = pattern.digits,
            first_index,
            frame_count,
            "opened image sequence"
        );

        Ok(Self {
            dir: dir.to_owned(),
            pattern,
            layout: Yuv420Layout::dense(width, height),
            frame_count,
            first_index,
        })
    }

    /// Number of frames before the sequence loops.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Return `true` when numbering starts at 1.
    pub fn starts_at_one(&self) -> bool {
        self.first_index == 1
    }

    /// Layout of every frame.
    pub fn layout(&self) -> Yuv420Layout {
        self.layout
    }

    /// Path of the file backing `frame`, after looping.
    pub fn frame_path(&self, frame: u64) -> PathBuf {
        let i = frame % self.frame_count + self.first_index;
        self.dir.join(self.pattern.file_name(i))
    }

    /// Read `frame`, wrapping modulo [`ImageSequence::frame_count`].
    pub fn read_frame(&self, frame: u64) -> YuvcompResult<Yuv420Buf> {
        let path = self.frame_path(frame);
        let mut data = vec![0u8; self.layout.data_size()];
        File::open(&path)
            .and_then(|mut f| f.read_exact(&mut data))
            .map_err(|e| {
                YuvcompError::resource(format!(
                    "read {} bytes from '{}': {e}",
                    data.len(),
                    path.display()
                ))
            })?;
        Yuv420Buf::from_vec(self.layout, data)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/image_seq.rs"]
mod tests;
