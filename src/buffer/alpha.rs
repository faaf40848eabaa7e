use crate::buffer::yuv::Plane;
use crate::foundation::math::align16;

/// Single 8-bit opacity plane with 16-byte aligned rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphaMask {
    width: u32,
    height: u32,
    row_bytes: usize,
    data: Vec<u8>,
}

impl AlphaMask {
    /// Allocate a fully transparent mask.
    pub fn new(width: u32, height: u32) -> Self {
        let row_bytes = align16(width as usize);
        Self {
            width,
            height,
            row_bytes,
            data: vec![0; row_bytes * height as usize],
        }
    }

    /// Mask width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Stride between rows.
    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    /// Opacity at `(x, y)`; zero outside the mask.
    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[y as usize * self.row_bytes + x as usize]
    }

    /// Read-only plane view.
    pub fn plane(&self) -> Plane<'_> {
        Plane {
            data: &self.data,
            width: self.width,
            height: self.height,
            row_bytes: self.row_bytes,
        }
    }

    /// Samples of row `y` (without padding), for filling at creation time.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.row_bytes;
        &mut self.data[start..start + self.width as usize]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/alpha.rs"]
mod tests;
