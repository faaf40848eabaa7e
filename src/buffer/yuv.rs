use crate::foundation::error::{YuvcompError, YuvcompResult};
use crate::foundation::math::{align16, half_up};

/// Neutral chroma value (no colour).
pub const CHROMA_NEUTRAL: u8 = 128;

/// Luma value of black in video range.
pub const LUMA_VIDEO_BLACK: u8 = 16;

/// Byte layout of a planar YUV 4:2:0 frame.
///
/// Planes are stored back to back in the order Y, Cr, Cb. Chroma planes are
/// `ceil(width/2) x ceil(height/2)` samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Yuv420Layout {
    /// Luma width in pixels.
    pub width: u32,
    /// Luma height in pixels.
    pub height: u32,
    /// Bytes per luma row.
    pub row_bytes_y: usize,
    /// Bytes per chroma row (both chroma planes).
    pub row_bytes_chroma: usize,
}

impl Yuv420Layout {
    /// Rows exactly as wide as the planes; the layout of `.yuv` sequence files.
    pub fn dense(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            row_bytes_y: width as usize,
            row_bytes_chroma: half_up(width) as usize,
        }
    }

    /// Rows rounded up to a multiple of 16 bytes.
    pub fn padded(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            row_bytes_y: align16(width as usize),
            row_bytes_chroma: align16(half_up(width) as usize),
        }
    }

    /// Chroma plane width in samples.
    pub fn chroma_width(&self) -> u32 {
        half_up(self.width)
    }

    /// Chroma plane height in rows.
    pub fn chroma_height(&self) -> u32 {
        half_up(self.height)
    }

    /// Size of the luma plane in bytes.
    pub fn luma_size(&self) -> usize {
        self.row_bytes_y * self.height as usize
    }

    /// Size of one chroma plane in bytes.
    pub fn chroma_size(&self) -> usize {
        self.row_bytes_chroma * self.chroma_height() as usize
    }

    /// Total bytes: `row_bytes_y*height + 2*row_bytes_chroma*chroma_height`.
    pub fn data_size(&self) -> usize {
        self.luma_size() + 2 * self.chroma_size()
    }

    fn validate(&self) -> YuvcompResult<()> {
        if self.row_bytes_y < self.width as usize
            || self.row_bytes_chroma < self.chroma_width() as usize
        {
            return Err(YuvcompError::invariant(format!(
                "row bytes {}/{} too small for {}x{} frame",
                self.row_bytes_y, self.row_bytes_chroma, self.width, self.height
            )));
        }
        Ok(())
    }

    fn check_len(&self, len: usize) -> YuvcompResult<()> {
        self.validate()?;
        if len != self.data_size() {
            return Err(YuvcompError::invariant(format!(
                "yuv420 {}x{} needs {} bytes, got {len}",
                self.width,
                self.height,
                self.data_size()
            )));
        }
        Ok(())
    }
}

/// Read-only view of one 8-bit plane.
#[derive(Clone, Copy, Debug)]
pub struct Plane<'a> {
    /// Plane bytes, `row_bytes * height` long.
    pub data: &'a [u8],
    /// Samples per row.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Stride between rows.
    pub row_bytes: usize,
}

impl<'a> Plane<'a> {
    /// Samples of row `y` (without padding).
    pub fn row(&self, y: u32) -> &'a [u8] {
        let start = y as usize * self.row_bytes;
        &self.data[start..start + self.width as usize]
    }
}

/// Mutable view of one 8-bit plane.
#[derive(Debug)]
pub struct PlaneMut<'a> {
    /// Plane bytes, `row_bytes * height` long.
    pub data: &'a mut [u8],
    /// Samples per row.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Stride between rows.
    pub row_bytes: usize,
}

impl PlaneMut<'_> {
    /// Samples of row `y` (without padding).
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.row_bytes;
        &mut self.data[start..start + self.width as usize]
    }

    /// Set every sample to `v`.
    pub fn fill(&mut self, v: u8) {
        for y in 0..self.height {
            self.row_mut(y).fill(v);
        }
    }

    /// Reborrow as a read-only plane.
    pub fn as_plane(&self) -> Plane<'_> {
        Plane {
            data: self.data,
            width: self.width,
            height: self.height,
            row_bytes: self.row_bytes,
        }
    }
}

fn split_planes<'a>(layout: &Yuv420Layout, data: &'a [u8]) -> [Plane<'a>; 3] {
    let (y, rest) = data.split_at(layout.luma_size());
    let (cr, cb) = rest.split_at(layout.chroma_size());
    let (cw, ch) = (layout.chroma_width(), layout.chroma_height());
    [
        Plane {
            data: y,
            width: layout.width,
            height: layout.height,
            row_bytes: layout.row_bytes_y,
        },
        Plane {
            data: cr,
            width: cw,
            height: ch,
            row_bytes: layout.row_bytes_chroma,
        },
        Plane {
            data: cb,
            width: cw,
            height: ch,
            row_bytes: layout.row_bytes_chroma,
        },
    ]
}

fn split_planes_mut<'a>(layout: &Yuv420Layout, data: &'a mut [u8]) -> [PlaneMut<'a>; 3] {
    let (y, rest) = data.split_at_mut(layout.luma_size());
    let (cr, cb) = rest.split_at_mut(layout.chroma_size());
    let (cw, ch) = (layout.chroma_width(), layout.chroma_height());
    [
        PlaneMut {
            data: y,
            width: layout.width,
            height: layout.height,
            row_bytes: layout.row_bytes_y,
        },
        PlaneMut {
            data: cr,
            width: cw,
            height: ch,
            row_bytes: layout.row_bytes_chroma,
        },
        PlaneMut {
            data: cb,
            width: cw,
            height: ch,
            row_bytes: layout.row_bytes_chroma,
        },
    ]
}

/// Borrowed, read-only YUV 4:2:0 frame (caller-owned or retained memory).
#[derive(Clone, Copy, Debug)]
pub struct Yuv420View<'a> {
    layout: Yuv420Layout,
    data: &'a [u8],
}

impl<'a> Yuv420View<'a> {
    /// Wrap `data`, which must be exactly `layout.data_size()` bytes.
    pub fn new(layout: Yuv420Layout, data: &'a [u8]) -> YuvcompResult<Self> {
        layout.check_len(data.len())?;
        Ok(Self { layout, data })
    }

    /// Frame layout.
    pub fn layout(&self) -> Yuv420Layout {
        self.layout
    }

    /// Luma width.
    pub fn width(&self) -> u32 {
        self.layout.width
    }

    /// Luma height.
    pub fn height(&self) -> u32 {
        self.layout.height
    }

    /// Whole byte region.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Planes in memory order: Y, Cr, Cb.
    pub fn planes(&self) -> [Plane<'a>; 3] {
        split_planes(&self.layout, self.data)
    }

    /// Luma plane.
    pub fn y(&self) -> Plane<'a> {
        let [y, _, _] = self.planes();
        y
    }

    /// Cr (V) plane.
    pub fn cr(&self) -> Plane<'a> {
        let [_, cr, _] = self.planes();
        cr
    }

    /// Cb (U) plane.
    pub fn cb(&self) -> Plane<'a> {
        let [_, _, cb] = self.planes();
        cb
    }

    /// Copy into a new buffer with dense rows.
    pub fn to_dense(&self) -> Yuv420Buf {
        let mut out = Yuv420Buf::new_dense(self.width(), self.height());
        for (src, mut dst) in self.planes().into_iter().zip(out.planes_mut()) {
            for y in 0..src.height {
                dst.row_mut(y).copy_from_slice(src.row(y));
            }
        }
        out
    }

    /// Write the planes with dense rows, in memory order.
    pub fn write_dense<W: std::io::Write>(&self, mut w: W) -> std::io::Result<()> {
        for plane in self.planes() {
            for y in 0..plane.height {
                w.write_all(plane.row(y))?;
            }
        }
        Ok(())
    }
}

/// Borrowed, writable YUV 4:2:0 frame. Never frees the memory it wraps.
#[derive(Debug)]
pub struct Yuv420ViewMut<'a> {
    layout: Yuv420Layout,
    data: &'a mut [u8],
}

impl<'a> Yuv420ViewMut<'a> {
    /// Wrap `data`, which must be exactly `layout.data_size()` bytes.
    pub fn new(layout: Yuv420Layout, data: &'a mut [u8]) -> YuvcompResult<Self> {
        layout.check_len(data.len())?;
        Ok(Self { layout, data })
    }

    /// Frame layout.
    pub fn layout(&self) -> Yuv420Layout {
        self.layout
    }

    /// Planes in memory order: Y, Cr, Cb.
    pub fn planes_mut(&mut self) -> [PlaneMut<'_>; 3] {
        split_planes_mut(&self.layout, self.data)
    }

    /// Read-only reborrow.
    pub fn as_view(&self) -> Yuv420View<'_> {
        Yuv420View {
            layout: self.layout,
            data: self.data,
        }
    }
}

/// Anything that can lend a [`Yuv420View`].
pub trait AsYuv420View {
    /// Borrow as a read-only view.
    fn as_yuv420_view(&self) -> Yuv420View<'_>;
}

impl AsYuv420View for Yuv420View<'_> {
    fn as_yuv420_view(&self) -> Yuv420View<'_> {
        *self
    }
}

impl AsYuv420View for Yuv420Buf {
    fn as_yuv420_view(&self) -> Yuv420View<'_> {
        self.view()
    }
}

/// Owned YUV 4:2:0 frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Yuv420Buf {
    layout: Yuv420Layout,
    data: Vec<u8>,
}

impl Yuv420Buf {
    /// Allocate a zeroed buffer with the given layout.
    pub fn with_layout(layout: Yuv420Layout) -> YuvcompResult<Self> {
        layout.validate()?;
        Ok(Self {
            layout,
            data: vec![0; layout.data_size()],
        })
    }

    /// Allocate with dense rows.
    pub fn new_dense(width: u32, height: u32) -> Self {
        let layout = Yuv420Layout::dense(width, height);
        Self {
            layout,
            data: vec![0; layout.data_size()],
        }
    }

    /// Allocate with 16-byte aligned rows.
    pub fn new_padded(width: u32, height: u32) -> Self {
        let layout = Yuv420Layout::padded(width, height);
        Self {
            layout,
            data: vec![0; layout.data_size()],
        }
    }

    /// Take ownership of `data`, which must be exactly `layout.data_size()` bytes.
    pub fn from_vec(layout: Yuv420Layout, data: Vec<u8>) -> YuvcompResult<Self> {
        layout.check_len(data.len())?;
        Ok(Self { layout, data })
    }

    /// Frame layout.
    pub fn layout(&self) -> Yuv420Layout {
        self.layout
    }

    /// Luma width.
    pub fn width(&self) -> u32 {
        self.layout.width
    }

    /// Luma height.
    pub fn height(&self) -> u32 {
        self.layout.height
    }

    /// Whole byte region.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Read-only view.
    pub fn view(&self) -> Yuv420View<'_> {
        Yuv420View {
            layout: self.layout,
            data: &self.data,
        }
    }

    /// Writable view.
    pub fn view_mut(&mut self) -> Yuv420ViewMut<'_> {
        Yuv420ViewMut {
            layout: self.layout,
            data: &mut self.data,
        }
    }

    /// Planes in memory order: Y, Cr, Cb.
    pub fn planes_mut(&mut self) -> [PlaneMut<'_>; 3] {
        split_planes_mut(&self.layout, &mut self.data)
    }

    /// Luma 0, chroma neutral.
    pub fn clear_to_neutral(&mut self) {
        self.fill(0, CHROMA_NEUTRAL);
    }

    /// Set every luma sample to `y` and every chroma sample to `chroma`.
    pub fn fill(&mut self, y: u8, chroma: u8) {
        let luma = self.layout.luma_size();
        self.data[..luma].fill(y);
        self.data[luma..].fill(chroma);
    }

    /// Change dimensions in place, keeping padded rows and reusing the allocation.
    ///
    /// Contents are unspecified afterwards.
    pub fn reshape_padded(&mut self, width: u32, height: u32) {
        let layout = Yuv420Layout::padded(width, height);
        if layout != self.layout {
            self.layout = layout;
            self.data.resize(layout.data_size(), 0);
        }
    }

    /// Release the byte storage.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/yuv.rs"]
mod tests;
