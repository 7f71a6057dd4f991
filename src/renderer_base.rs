//! Base renderer with clipping.
//!
//! Wraps a pixel format with a clip rectangle so cell squares, guide lines
//! and diagram boxes can be drawn without bounds checks at the call site.

use crate::basics::RectI;
use crate::pixfmt_rgba::PixelFormat;

// ============================================================================
// RendererBase: clip-and-delegate renderer
// ============================================================================

/// Base renderer that clips all operations to a rectangle before delegating
/// to the underlying pixel format.
pub struct RendererBase<PF: PixelFormat> {
    ren: PF,
    clip_box: RectI,
}

impl<PF: PixelFormat> RendererBase<PF> {
    /// Create a new renderer wrapping the given pixel format.
    /// The clip box is initialized to the full buffer extent.
    pub fn new(ren: PF) -> Self {
        let w = ren.width() as i32;
        let h = ren.height() as i32;
        Self {
            ren,
            clip_box: RectI::new(0, 0, w - 1, h - 1),
        }
    }

    pub fn width(&self) -> u32 {
        self.ren.width()
    }
    pub fn height(&self) -> u32 {
        self.ren.height()
    }

    pub fn xmin(&self) -> i32 {
        self.clip_box.x1
    }
    pub fn ymin(&self) -> i32 {
        self.clip_box.y1
    }
    pub fn xmax(&self) -> i32 {
        self.clip_box.x2
    }
    pub fn ymax(&self) -> i32 {
        self.clip_box.y2
    }

    #[inline]
    pub fn inbox(&self, x: i32, y: i32) -> bool {
        self.clip_box.hit_test(x, y)
    }

    // ========================================================================
    // Rendering operations (clip then delegate)
    // ========================================================================

    /// Clear the entire buffer to a solid color.
    pub fn clear(&mut self, c: &PF::ColorType) {
        let w = self.ren.width();
        if w > 0 {
            for y in 0..self.ren.height() as i32 {
                self.ren.copy_hline(0, y, w, c);
            }
        }
    }

    /// Copy a single pixel (clipped).
    pub fn copy_pixel(&mut self, x: i32, y: i32, c: &PF::ColorType) {
        if self.inbox(x, y) {
            self.ren.copy_pixel(x, y, c);
        }
    }

    /// Blend a single pixel (clipped).
    pub fn blend_pixel(&mut self, x: i32, y: i32, c: &PF::ColorType) {
        if self.inbox(x, y) {
            self.ren.blend_pixel(x, y, c);
        }
    }

    /// Get the pixel at (x, y), or default if outside clip.
    pub fn pixel(&self, x: i32, y: i32) -> PF::ColorType
    where
        PF::ColorType: Default,
    {
        if self.inbox(x, y) {
            self.ren.pixel(x, y)
        } else {
            PF::ColorType::default()
        }
    }

    /// Clip an inclusive horizontal run; `None` if nothing is visible.
    fn clip_hline(&self, mut x1: i32, y: i32, mut x2: i32) -> Option<(i32, u32)> {
        if x1 > x2 {
            std::mem::swap(&mut x1, &mut x2);
        }
        if y > self.ymax() || y < self.ymin() || x1 > self.xmax() || x2 < self.xmin() {
            return None;
        }
        x1 = x1.max(self.xmin());
        x2 = x2.min(self.xmax());
        Some((x1, (x2 - x1 + 1) as u32))
    }

    /// Copy a horizontal line (clipped). x1, x2 are inclusive endpoints.
    pub fn copy_hline(&mut self, x1: i32, y: i32, x2: i32, c: &PF::ColorType) {
        if let Some((x, len)) = self.clip_hline(x1, y, x2) {
            self.ren.copy_hline(x, y, len, c);
        }
    }

    /// Blend a horizontal line (clipped). x1, x2 are inclusive endpoints.
    pub fn blend_hline(&mut self, x1: i32, y: i32, x2: i32, c: &PF::ColorType) {
        if let Some((x, len)) = self.clip_hline(x1, y, x2) {
            self.ren.blend_hline(x, y, len, c);
        }
    }

    /// Blend a vertical line (clipped). y1, y2 are inclusive endpoints.
    pub fn blend_vline(&mut self, x: i32, y1: i32, y2: i32, c: &PF::ColorType) {
        let (y1, y2) = if y1 > y2 { (y2, y1) } else { (y1, y2) };
        if x < self.xmin() || x > self.xmax() {
            return;
        }
        for y in y1.max(self.ymin())..=y2.min(self.ymax()) {
            self.ren.blend_pixel(x, y, c);
        }
    }

    /// Fill a rectangle by overwriting (clipped). Corners are inclusive.
    pub fn copy_bar(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, c: &PF::ColorType) {
        let mut rc = RectI::new(x1, y1, x2, y2);
        rc.normalize();
        if rc.clip(&self.clip_box) {
            for y in rc.y1..=rc.y2 {
                self.ren.copy_hline(rc.x1, y, (rc.x2 - rc.x1 + 1) as u32, c);
            }
        }
    }

    /// Fill a rectangle by blending (clipped). Corners are inclusive.
    pub fn blend_bar(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, c: &PF::ColorType) {
        let mut rc = RectI::new(x1, y1, x2, y2);
        rc.normalize();
        if rc.clip(&self.clip_box) {
            for y in rc.y1..=rc.y2 {
                self.ren.blend_hline(rc.x1, y, (rc.x2 - rc.x1 + 1) as u32, c);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;
    use crate::pixfmt_rgba::PixfmtRgba32;
    use crate::rendering_buffer::RenderingBuffer;

    #[test]
    fn test_new() {
        let mut rb = RenderingBuffer::new(100, 80);
        let ren = RendererBase::new(PixfmtRgba32::new(&mut rb));
        assert_eq!(ren.width(), 100);
        assert_eq!(ren.height(), 80);
        assert_eq!(ren.xmin(), 0);
        assert_eq!(ren.ymin(), 0);
        assert_eq!(ren.xmax(), 99);
        assert_eq!(ren.ymax(), 79);
    }

    #[test]
    fn test_clear() {
        let mut rb = RenderingBuffer::new(10, 10);
        let mut ren = RendererBase::new(PixfmtRgba32::new(&mut rb));
        ren.clear(&Rgba8::grey(255));
        assert_eq!(ren.pixel(5, 5), Rgba8::grey(255));
    }

    #[test]
    fn test_copy_pixel_clipped() {
        let mut rb = RenderingBuffer::new(10, 10);
        let mut ren = RendererBase::new(PixfmtRgba32::new(&mut rb));
        let red = Rgba8::new(255, 0, 0, 255);
        ren.copy_pixel(5, 5, &red);
        assert_eq!(ren.pixel(5, 5).r, 255);
        ren.copy_pixel(-1, 5, &red);
        ren.copy_pixel(100, 5, &red);
        assert_eq!(ren.pixel(-1, 5), Rgba8::default());
    }

    #[test]
    fn test_blend_hline_clipped() {
        let mut rb = RenderingBuffer::new(20, 10);
        let mut ren = RendererBase::new(PixfmtRgba32::new(&mut rb));
        let green = Rgba8::new(0, 255, 0, 255);
        ren.blend_hline(15, 5, 25, &green);
        assert_eq!(ren.pixel(15, 5).g, 255);
        assert_eq!(ren.pixel(19, 5).g, 255);
        assert_eq!(ren.pixel(14, 5).g, 0);
    }

    #[test]
    fn test_blend_vline_clipped() {
        let mut rb = RenderingBuffer::new(5, 5);
        let mut ren = RendererBase::new(PixfmtRgba32::new(&mut rb));
        let c = Rgba8::grey(200);
        ren.blend_vline(2, -3, 9, &c);
        for y in 0..5 {
            assert_eq!(ren.pixel(2, y), c);
        }
        ren.blend_vline(7, 0, 4, &c);
    }

    #[test]
    fn test_copy_bar_clipped() {
        let mut rb = RenderingBuffer::new(20, 20);
        let mut ren = RendererBase::new(PixfmtRgba32::new(&mut rb));
        let c = Rgba8::white_with_intensity(0.5);
        ren.copy_bar(15, 15, 24, 24, &c);
        assert_eq!(ren.pixel(15, 15), c);
        assert_eq!(ren.pixel(19, 19), c);
        assert_eq!(ren.pixel(14, 15), Rgba8::transparent());
    }

    #[test]
    fn test_blend_bar_over_background() {
        let mut rb = RenderingBuffer::new(10, 10);
        let mut ren = RendererBase::new(PixfmtRgba32::new(&mut rb));
        ren.clear(&Rgba8::new_opaque(0, 0, 0));
        ren.blend_bar(0, 0, 4, 4, &Rgba8::grey(255));
        assert_eq!(ren.pixel(4, 4), Rgba8::grey(255));
        assert_eq!(ren.pixel(5, 5), Rgba8::new_opaque(0, 0, 0));
    }

    #[test]
    fn test_inbox_is_buffer_extent() {
        let mut rb = RenderingBuffer::new(100, 50);
        let ren = RendererBase::new(PixfmtRgba32::new(&mut rb));
        assert!(ren.inbox(99, 49));
        assert!(!ren.inbox(100, 0));
        assert!(!ren.inbox(0, -1));
    }
}
