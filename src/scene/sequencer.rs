use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{YuvcompError, YuvcompResult};
use crate::input::fileseq::{SeqPattern, list_files_with_ext};

const VIDEO_LAYERS_ID: &str = "vl";
const FOREGROUND_ID: &str = "fg";

/// Scene changes recorded for one frame. Absent fields mean "unchanged".
#[derive(Clone, Debug, PartialEq)]
pub struct SceneUpdateAtFrame {
    /// Frame the update applies to.
    pub index: FrameIndex,
    /// Replacement video-layer list JSON.
    pub video_layers_json: Option<String>,
    /// Replacement foreground display-list JSON.
    pub foreground_json: Option<String>,
    /// Multiplier for layer coordinates in `video_layers_json`.
    pub layer_scale: f64,
}

impl SceneUpdateAtFrame {
    /// Update that changes nothing.
    pub fn empty(index: FrameIndex, layer_scale: f64) -> Self {
        Self {
            index,
            video_layers_json: None,
            foreground_json: None,
            layer_scale,
        }
    }

    /// Return `true` when neither channel changes at this frame.
    pub fn is_empty(&self) -> bool {
        self.video_layers_json.is_none() && self.foreground_json.is_none()
    }
}

#[derive(Clone, Debug, Default)]
struct FrameFiles {
    video_layers: Option<PathBuf>,
    foreground: Option<PathBuf>,
}

/// Sparse, frame-indexed scene updates backed by `<root>vl_NNNN.json` / `<root>fg_NNNN.json` files.
///
/// File contents are read lazily in [`SceneSequencer::read_at_frame`]; opening only indexes names.
#[derive(Debug)]
pub struct SceneSequencer {
    dir: PathBuf,
    root: String,
    layer_scale: f64,
    frames: BTreeMap<u64, FrameFiles>,
}

impl SceneSequencer {
    /// Index the scene files in `dir`.
    ///
    /// The first JSON file by name fixes the root prefix and digit count. Files with another root
    /// or an id other than `vl`/`fg` are skipped with a warning.
    #[tracing::instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn open(dir: impl AsRef<Path>) -> YuvcompResult<Self> {
        let dir = dir.as_ref();
        let files = list_files_with_ext(dir, "json")?;
        let first = files.first().ok_or_else(|| {
            YuvcompError::resource(format!("no scene JSON files in '{}'", dir.display()))
        })?;
        let pattern = SeqPattern::from_path(first)?;
        let root = [VIDEO_LAYERS_ID, FOREGROUND_ID]
            .iter()
            .find_map(|id| pattern.prefix.strip_suffix(&format!("{id}_")))
            .ok_or_else(|| {
                YuvcompError::validation(format!(
                    "scene file '{}' is not <root>vl_<digits>.json or <root>fg_<digits>.json",
                    first.display()
                ))
            })?
            .to_owned();

        let vl = SeqPattern {
            prefix: format!("{root}{VIDEO_LAYERS_ID}_"),
            ..pattern.clone()
        };
        let fg = SeqPattern {
            prefix: format!("{root}{FOREGROUND_ID}_"),
            ..pattern
        };

        let mut frames: BTreeMap<u64, FrameFiles> = BTreeMap::new();
        for path in files {
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(i) = vl.index_of(name) {
                frames.entry(i).or_default().video_layers = Some(path);
            } else if let Some(i) = fg.index_of(name) {
                frames.entry(i).or_default().foreground = Some(path);
            } else {
                tracing::warn!(file = name, root = %root, "skipping unrecognized scene file");
            }
        }
        tracing::debug!(frames = frames.len(), root = %root, "indexed scene sequence");

        Ok(Self {
            dir: dir.to_owned(),
            root,
            layer_scale: 1.0,
            frames,
        })
    }

    /// Stamp `layer_scale` into every update read from this sequence.
    pub fn with_layer_scale(mut self, layer_scale: f64) -> Self {
        self.layer_scale = layer_scale;
        self
    }

    /// Directory the sequence was opened from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Shared file-name root, e.g. `scene_` for `scene_vl_0000.json`.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Frames that carry at least one update, ascending.
    pub fn frame_indices(&self) -> impl Iterator<Item = FrameIndex> + '_ {
        self.frames.keys().map(|&i| FrameIndex(i))
    }

    /// Highest frame with an update, or `None` for an empty sequence.
    pub fn max_frame_index(&self) -> Option<FrameIndex> {
        self.frames.keys().next_back().map(|&i| FrameIndex(i))
    }

    /// Read the updates recorded for exactly `frame`.
    ///
    /// Frames without files return an empty update.
    pub fn read_at_frame(&self, frame: FrameIndex) -> YuvcompResult<SceneUpdateAtFrame> {
        let mut update = SceneUpdateAtFrame::empty(frame, self.layer_scale);
        if let Some(files) = self.frames.get(&frame.0) {
            update.video_layers_json = files.video_layers.as_deref().map(read_text).transpose()?;
            update.foreground_json = files.foreground.as_deref().map(read_text).transpose()?;
        }
        Ok(update)
    }
}

fn read_text(path: &Path) -> YuvcompResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        YuvcompError::resource(format!("read scene file '{}': {e}", path.display()))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/scene/sequencer.rs"]
mod tests;
