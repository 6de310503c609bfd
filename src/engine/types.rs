use serde::{Deserialize, Serialize};

/// Dimensions of the canvas the search renders into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDimensions {
    pub width: usize,
    pub height: usize,
}

impl FrameDimensions {
    #[inline]
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Bytes needed for a 4-byte-per-pixel buffer of this size.
    #[inline]
    pub fn buffer_len(&self) -> usize {
        self.area() * 4
    }
}

/// Integer rectangle in pixel space. Covers columns `x..x+w` and rows `y..y+h`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntRect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl IntRect {
    #[inline]
    pub fn empty() -> Self {
        Self { x: 0, y: 0, w: 0, h: 0 }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    #[inline]
    pub fn right(&self) -> usize {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> usize {
        self.y + self.h
    }
}
