//! Rendering buffer: row-oriented access to an owned RGBA pixel buffer.
//!
//! Rows are stored top-down with a fixed stride of `width * 4` bytes. The
//! buffer owns its bytes, so a finished frame can be handed to a canvas
//! (`into_vec`) or written to disk without copying.

/// Bytes per RGBA pixel.
pub const BPP: usize = 4;

/// Owned RGBA buffer with row access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderingBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl RenderingBuffer {
    /// Create a buffer of `width * height` fully transparent pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * BPP],
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row length in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * BPP
    }

    /// Immutable slice for row `y`.
    pub fn row_slice(&self, y: u32) -> &[u8] {
        assert!(
            y < self.height,
            "row {} out of bounds (height={})",
            y,
            self.height
        );
        let start = y as usize * self.stride();
        &self.data[start..start + self.stride()]
    }

    /// Mutable slice for row `y`.
    pub fn row_slice_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(
            y < self.height,
            "row {} out of bounds (height={})",
            y,
            self.height
        );
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

// ============================================================================
// Tests
// ============================================================================
