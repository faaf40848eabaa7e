//! Numbered file-sequence naming: `<prefix><digits>.<ext>`, where the prefix ends with `_`.

use std::path::{Path, PathBuf};

use crate::foundation::error::{YuvcompError, YuvcompResult};

/// Naming scheme shared by every file of a numbered sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeqPattern {
    /// File stem up to and including the last `_`.
    pub prefix: String,
    /// Zero-padded width of the frame number.
    pub digits: usize,
    /// Extension without the dot.
    pub ext: String,
}

impl SeqPattern {
    /// Infer the pattern from one member file name, e.g. `clip_0007.yuv`.
    pub fn from_path(path: &Path) -> YuvcompResult<Self> {
        let invalid = || {
            YuvcompError::validation(format!(
                "sequence file name '{}' is not <prefix>_<digits>.<ext>",
                path.display()
            ))
        };
        let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(invalid)?;
        let ext = path.extension().and_then(|s| s.to_str()).ok_or_else(invalid)?;
        let idx = stem.rfind('_').ok_or_else(invalid)?;
        let digits = &stem[idx + 1..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        Ok(Self {
            prefix: stem[..=idx].to_owned(),
            digits: digits.len(),
            ext: ext.to_owned(),
        })
    }

    /// File name for `index`, zero-padded to the pattern width.
    pub fn file_name(&self, index: u64) -> String {
        format!(
            "{}{:0width$}.{}",
            self.prefix,
            index,
            self.ext,
            width = self.digits
        )
    }

    /// Frame number of `file_name` if it belongs to this sequence.
    pub fn index_of(&self, file_name: &str) -> Option<u64> {
        let rest = file_name.strip_prefix(&self.prefix)?;
        let digits = rest.strip_suffix(&self.ext)?.strip_suffix('.')?;
        if digits.len() != self.digits || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

/// Sorted regular files in `dir` whose extension is `ext`.
pub fn list_files_with_ext(dir: &Path, ext: &str) -> YuvcompResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        YuvcompError::resource(format!("read sequence directory '{}': {e}", dir.display()))
    })?;
    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            YuvcompError::resource(format!("read sequence directory '{}': {e}", dir.display()))
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some(ext) {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/input/fileseq.rs"]
mod tests;
