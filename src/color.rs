//! 8-bit RGBA color and the fixed-point channel arithmetic used by the
//! pixel format.

/// RGBA color with u8 components, non-premultiplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BASE_SHIFT: u32 = 8;
    pub const BASE_SCALE: u32 = 1 << Self::BASE_SHIFT;
    pub const BASE_MASK: u32 = Self::BASE_SCALE - 1;
    pub const BASE_MSB: u32 = 1 << (Self::BASE_SHIFT - 1);

    pub fn new(r: u32, g: u32, b: u32, a: u32) -> Self {
        Self {
            r: r as u8,
            g: g as u8,
            b: b as u8,
            a: a as u8,
        }
    }

    pub fn new_opaque(r: u32, g: u32, b: u32) -> Self {
        Self::new(r, g, b, Self::BASE_MASK)
    }

    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Opaque grey with all three channels set to `v`.
    pub fn grey(v: u8) -> Self {
        Self {
            r: v,
            g: v,
            b: v,
            a: 255,
        }
    }

    /// White whose alpha channel carries `intensity` in `[0, 1]`.
    pub fn white_with_intensity(intensity: f64) -> Self {
        Self {
            r: 255,
            g: 255,
            b: 255,
            a: Self::from_double(intensity),
        }
    }

    /// Build a color from a `#rrggbb` hex literal.
    pub const fn from_hex(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xFF) as u8,
            g: ((v >> 8) & 0xFF) as u8,
            b: (v & 0xFF) as u8,
            a: 255,
        }
    }

    pub fn to_double(a: u8) -> f64 {
        a as f64 / Self::BASE_MASK as f64
    }

    /// Convert a `[0, 1]` value to the nearest channel value.
    /// Out-of-range and NaN inputs are clamped.
    pub fn from_double(a: f64) -> u8 {
        if a.is_nan() || a <= 0.0 {
            0
        } else if a >= 1.0 {
            Self::BASE_MASK as u8
        } else {
            (a * Self::BASE_MASK as f64 + 0.5) as u8
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == Self::BASE_MASK as u8
    }

    /// Copy of this color with a new alpha.
    pub fn with_alpha(&self, a: u8) -> Self {
        Self { a, ..*self }
    }

    /// CSS `rgba()` notation, the form canvas and SVG fills accept.
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            Self::to_double(self.a)
        )
    }

    pub fn to_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Interpolate p to q by a.
    #[inline]
    pub fn lerp(p: u8, q: u8, a: u8) -> u8 {
        let t = (q as i32 - p as i32) * a as i32 + Self::BASE_MSB as i32 - (p > q) as i32;
        (p as i32 + (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT)) as u8
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_double_clamps() {
        assert_eq!(Rgba8::from_double(0.0), 0);
        assert_eq!(Rgba8::from_double(1.0), 255);
        assert_eq!(Rgba8::from_double(0.5), 128);
        assert_eq!(Rgba8::from_double(-3.0), 0);
        assert_eq!(Rgba8::from_double(7.0), 255);
        assert_eq!(Rgba8::from_double(f64::NAN), 0);
    }

    #[test]
    fn test_white_with_intensity() {
        let c = Rgba8::white_with_intensity(0.2);
        assert_eq!((c.r, c.g, c.b), (255, 255, 255));
        assert_eq!(c.a, 51);
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgba8::from_hex(0x137fec), Rgba8::new(19, 127, 236, 255));
        assert_eq!(Rgba8::from_hex(0x1a1a1a), Rgba8::grey(26));
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(Rgba8::lerp(0, 255, 0), 0);
        assert_eq!(Rgba8::lerp(0, 255, 255), 255);
        assert_eq!(Rgba8::lerp(200, 100, 255), 100);
    }

    #[test]
    fn test_to_css() {
        let c = Rgba8::from_hex(0x137fec).with_alpha(0);
        assert_eq!(c.to_css(), "rgba(19, 127, 236, 0)");
        assert!(c.is_transparent());
        assert!(Rgba8::grey(3).is_opaque());
    }
}
