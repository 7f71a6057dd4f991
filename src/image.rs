//! Owned RGBA image value returned by the visualizer.

use crate::rendering_buffer::{RenderingBuffer, BPP};

/// An RGBA pixel buffer with dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data, row-major, top-to-bottom. Length = width * height * 4.
    pub data: Vec<u8>,
}

impl RgbaImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * BPP],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * BPP;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Returns `true` if every pixel has zero alpha.
    pub fn is_transparent(&self) -> bool {
        self.data.chunks_exact(BPP).all(|p| p[3] == 0)
    }
}

impl From<RenderingBuffer> for RgbaImage {
    fn from(rb: RenderingBuffer) -> Self {
        let (width, height) = (rb.width(), rb.height());
        Self {
            width,
            height,
            data: rb.into_vec(),
        }
    }
}
