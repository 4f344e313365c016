//! Cell geometry types

/// A rectangular region of the image in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl CellRect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// One past the last column.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// One past the last row.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub fn overlaps(&self, other: &CellRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Layout of the raw working buffer, handed by value to every worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMetadata {
    pub bytes_per_pixel: usize,
    pub stride: usize,
    pub width: usize,
    pub height: usize,
}

impl FrameMetadata {
    /// Byte offset of the first channel of pixel `(x, y)`.
    #[inline]
    pub fn pixel_index(&self, x: usize, y: usize) -> usize {
        y * self.stride + x * self.bytes_per_pixel
    }
}

/// The partition computed for one processing invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    pub cells: Vec<CellRect>,
    pub frame: FrameMetadata,
}
