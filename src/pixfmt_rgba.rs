//! RGBA pixel format with alpha blending.
//!
//! Reads and writes RGBA32 pixels (4 bytes per pixel, non-premultiplied
//! alpha). Provides the `PixelFormat` trait and `PixfmtRgba32`.

use crate::color::Rgba8;
use crate::rendering_buffer::{RenderingBuffer, BPP};

// ============================================================================
// PixelFormat trait
// ============================================================================

/// Trait for pixel formats that can write and blend colors into a buffer.
///
/// This is the seam between the numeric code and whatever surface finally
/// shows the pixels; the visualizer only ever talks to a `PixelFormat`.
pub trait PixelFormat {
    type ColorType;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Blend a single pixel at (x, y) with color `c` (source-over by `c`'s alpha).
    fn blend_pixel(&mut self, x: i32, y: i32, c: &Self::ColorType);

    /// Copy (overwrite) a horizontal line of `len` pixels with color `c`.
    fn copy_hline(&mut self, x: i32, y: i32, len: u32, c: &Self::ColorType);

    /// Blend a horizontal line of `len` pixels with color `c`.
    fn blend_hline(&mut self, x: i32, y: i32, len: u32, c: &Self::ColorType);

    /// Copy (overwrite) a single pixel at (x, y) with color `c`.
    fn copy_pixel(&mut self, x: i32, y: i32, c: &Self::ColorType);

    /// Get the pixel color at (x, y).
    fn pixel(&self, x: i32, y: i32) -> Self::ColorType;
}

// ============================================================================
// PixfmtRgba32: non-premultiplied RGBA, 8 bits per channel
// ============================================================================

/// Pixel format for non-premultiplied RGBA32.
/// Component order: R=0, G=1, B=2, A=3.
pub struct PixfmtRgba32<'a> {
    rbuf: &'a mut RenderingBuffer,
}

impl<'a> PixfmtRgba32<'a> {
    pub fn new(rbuf: &'a mut RenderingBuffer) -> Self {
        Self { rbuf }
    }

    #[inline]
    fn blend_pix(p: &mut [u8], c: &Rgba8) {
        if c.a == 255 {
            p.copy_from_slice(&c.to_array());
        } else if c.a > 0 {
            p[0] = Rgba8::lerp(p[0], c.r, c.a);
            p[1] = Rgba8::lerp(p[1], c.g, c.a);
            p[2] = Rgba8::lerp(p[2], c.b, c.a);
            p[3] = Rgba8::lerp(p[3], 255, c.a);
        }
    }
}

impl<'a> PixelFormat for PixfmtRgba32<'a> {
    type ColorType = Rgba8;

    fn width(&self) -> u32 {
        self.rbuf.width()
    }

    fn height(&self) -> u32 {
        self.rbuf.height()
    }

    fn pixel(&self, x: i32, y: i32) -> Rgba8 {
        let row = self.rbuf.row_slice(y as u32);
        let off = x as usize * BPP;
        Rgba8::new(
            row[off] as u32,
            row[off + 1] as u32,
            row[off + 2] as u32,
            row[off + 3] as u32,
        )
    }

    fn copy_pixel(&mut self, x: i32, y: i32, c: &Rgba8) {
        let row = self.rbuf.row_slice_mut(y as u32);
        let off = x as usize * BPP;
        row[off..off + BPP].copy_from_slice(&c.to_array());
    }

    fn copy_hline(&mut self, x: i32, y: i32, len: u32, c: &Rgba8) {
        let row = self.rbuf.row_slice_mut(y as u32);
        let start = x as usize * BPP;
        for px in row[start..start + len as usize * BPP].chunks_exact_mut(BPP) {
            px.copy_from_slice(&c.to_array());
        }
    }

    fn blend_pixel(&mut self, x: i32, y: i32, c: &Rgba8) {
        let row = self.rbuf.row_slice_mut(y as u32);
        let off = x as usize * BPP;
        Self::blend_pix(&mut row[off..off + BPP], c);
    }

    fn blend_hline(&mut self, x: i32, y: i32, len: u32, c: &Rgba8) {
        let row = self.rbuf.row_slice_mut(y as u32);
        let start = x as usize * BPP;
        for px in row[start..start + len as usize * BPP].chunks_exact_mut(BPP) {
            Self::blend_pix(px, c);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
