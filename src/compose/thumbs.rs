use crate::buffer::yuv::{PlaneMut, Yuv420View};
use crate::foundation::core::FrameIndex;
use crate::foundation::math::LUMA_FLOOR;
use crate::pixel::scale::{PixelRect, scale_plane_bilinear};

/// Luma-to-glyph ramp, darkest first.
pub const ASCII_RAMP: &[u8; 93] =
    b"  `.-':_,^=;><+!rc*/z?sltv)j7(|fi{C}FI31TLu[neoZ5YxJya]2ESwqkP6h9d4VpOGbUAKXHm8RD#$Bg0MNWQ%&@";

/// Output encoding for captured thumbnails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThumbnailMode {
    /// `width * height` luma bytes, no separators.
    RawLuma,
    /// Text art with a dashed border row above and below.
    #[default]
    Ascii,
}

/// Thumbnail capture settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThumbnailOpts {
    /// Thumbnail width in samples (characters in ASCII mode).
    pub width: u32,
    /// Thumbnail height in rows.
    pub height: u32,
    /// Capture every `interval_frames` frames; 0 disables capture.
    pub interval_frames: u64,
    /// Output encoding.
    pub mode: ThumbnailMode,
}

impl Default for ThumbnailOpts {
    fn default() -> Self {
        Self {
            width: 78,
            height: 20,
            interval_frames: 60,
            mode: ThumbnailMode::default(),
        }
    }
}

impl ThumbnailOpts {
    /// Return `true` when a thumbnail should be captured at `frame`.
    pub fn captures_at(&self, frame: FrameIndex) -> bool {
        if self.width < 1 || self.height < 1 || self.interval_frames < 1 {
            return false;
        }
        self.interval_frames == 1 || frame.0 % self.interval_frames == 0
    }
}

/// One captured thumbnail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Thumbnail {
    /// Downscaled luma bytes.
    RawLuma(Vec<u8>),
    /// ASCII art, rows joined by `\n`.
    Ascii(String),
}

impl Thumbnail {
    /// Encoded bytes, ready to be written to a file.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::RawLuma(b) => b,
            Self::Ascii(s) => s.as_bytes(),
        }
    }
}

/// Thumbnails taken before and after the foreground overlay at one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThumbnailPair {
    /// Frame the pair was captured at.
    pub frame: FrameIndex,
    /// Composite of the video layers only.
    pub before_foreground: Thumbnail,
    /// Final composite.
    pub after_foreground: Thumbnail,
}

/// Glyph for one video-range luma sample.
pub fn luma_glyph(y: u8) -> u8 {
    let v = u32::from(y.saturating_sub(LUMA_FLOOR)).min(219);
    ASCII_RAMP[((v * 110) >> 8).min(92) as usize]
}

/// Downscale the luma plane of `frame` and encode it per `opts`.
///
/// A zero width or height yields an empty thumbnail.
pub fn render_thumbnail(opts: &ThumbnailOpts, frame: Yuv420View<'_>) -> Thumbnail {
    let (w, h) = (opts.width, opts.height);
    if w == 0 || h == 0 {
        return match opts.mode {
            ThumbnailMode::RawLuma => Thumbnail::RawLuma(Vec::new()),
            ThumbnailMode::Ascii => Thumbnail::Ascii(String::new()),
        };
    }
    let mut luma = vec![0u8; w as usize * h as usize];
    let src = frame.y();
    let mut dst = PlaneMut {
        data: &mut luma,
        width: w,
        height: h,
        row_bytes: w as usize,
    };
    scale_plane_bilinear(
        src,
        PixelRect::sized(src.width, src.height),
        &mut dst,
        PixelRect::sized(w, h),
    );

    match opts.mode {
        ThumbnailMode::RawLuma => Thumbnail::RawLuma(luma),
        ThumbnailMode::Ascii => Thumbnail::Ascii(ascii_art(&luma, w as usize)),
    }
}

fn ascii_art(luma: &[u8], width: usize) -> String {
    let border = "-".repeat(width);
    let mut out = String::with_capacity((width + 1) * (luma.len() / width.max(1) + 2));
    out.push_str(&border);
    for row in luma.chunks_exact(width) {
        out.push('\n');
        out.extend(row.iter().map(|&y| char::from(luma_glyph(y))));
    }
    out.push('\n');
    out.push_str(&border);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/compose/thumbs.rs"]
mod tests;
