//! Foundation types and constants.
//!
//! Grid geometry shared by every other module: the 28×28 sample grid, the
//! on-screen cell size, points and integer rectangles.

// ============================================================================
// Grid geometry
// ============================================================================

/// Number of cells along each side of the intensity grid.
pub const GRID_SIZE: usize = 28;

/// On-screen pixels per grid cell edge.
pub const CELL_SIZE: i32 = 10;

/// On-screen canvas edge in pixels (`GRID_SIZE * CELL_SIZE`).
pub const CANVAS_SIZE: u32 = GRID_SIZE as u32 * CELL_SIZE as u32;

/// Maximum on-screen distance between two brush deposits along a stroke.
pub const STROKE_STEP: f64 = 7.0;

/// Floor a double toward negative infinity.
#[inline]
pub fn ifloor(v: f64) -> i32 {
    v.floor() as i32
}

/// Map an on-screen position to the grid cell that contains it.
///
/// Positions left of or above the canvas map to negative cells; `None` for
/// non-finite coordinates.
#[inline]
pub fn cell_of(p: PointD) -> Option<(i32, i32)> {
    if !(p.x.is_finite() && p.y.is_finite()) {
        return None;
    }
    Some((ifloor(p.x / CELL_SIZE as f64), ifloor(p.y / CELL_SIZE as f64)))
}

/// Returns `true` if `(x, y)` addresses a cell of the grid.
#[inline]
pub fn cell_in_grid(x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && (x as usize) < GRID_SIZE && (y as usize) < GRID_SIZE
}

// ============================================================================
// Rect
// ============================================================================

/// A rectangle defined by two corner points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect<T: Copy> {
    pub x1: T,
    pub y1: T,
    pub x2: T,
    pub y2: T,
}

impl<T: Copy + PartialOrd> Rect<T> {
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Normalize so that x1 <= x2 and y1 <= y2, swapping if needed.
    pub fn normalize(&mut self) -> &Self {
        if self.x1 > self.x2 {
            core::mem::swap(&mut self.x1, &mut self.x2);
        }
        if self.y1 > self.y2 {
            core::mem::swap(&mut self.y1, &mut self.y2);
        }
        self
    }

    /// Clip this rectangle to the intersection with `r`.
    /// Returns `true` if the result is non-empty.
    pub fn clip(&mut self, r: &Self) -> bool {
        if self.x2 > r.x2 {
            self.x2 = r.x2;
        }
        if self.y2 > r.y2 {
            self.y2 = r.y2;
        }
        if self.x1 < r.x1 {
            self.x1 = r.x1;
        }
        if self.y1 < r.y1 {
            self.y1 = r.y1;
        }
        self.is_valid()
    }

    pub fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    pub fn hit_test(&self, x: T, y: T) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

/// Rectangle with inclusive `i32` pixel corners.
pub type RectI = Rect<i32>;
/// Rectangle with `f64` coordinates (diagram layout).
pub type RectD = Rect<f64>;

// ============================================================================
// Point
// ============================================================================

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointBase<T: Copy> {
    pub x: T,
    pub y: T,
}

impl<T: Copy> PointBase<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

pub type PointD = PointBase<f64>;

impl PointD {
    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &PointD) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation toward `other` at parameter `t`.
    pub fn lerp(&self, other: &PointD, t: f64) -> PointD {
        PointD::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_size() {
        assert_eq!(CANVAS_SIZE, 280);
    }

    #[test]
    fn test_cell_of() {
        assert_eq!(cell_of(PointD::new(0.0, 0.0)), Some((0, 0)));
        assert_eq!(cell_of(PointD::new(9.99, 10.0)), Some((0, 1)));
        assert_eq!(cell_of(PointD::new(279.5, 145.0)), Some((27, 14)));
        assert_eq!(cell_of(PointD::new(-0.5, 3.0)), Some((-1, 0)));
        assert_eq!(cell_of(PointD::new(f64::NAN, 3.0)), None);
        assert_eq!(cell_of(PointD::new(3.0, f64::INFINITY)), None);
        assert_eq!(cell_of(PointD::new(3.0e10, 5.0)), Some((i32::MAX, 0)));
    }

    #[test]
    fn test_cell_in_grid() {
        assert!(cell_in_grid(0, 0));
        assert!(cell_in_grid(27, 27));
        assert!(!cell_in_grid(28, 0));
        assert!(!cell_in_grid(0, -1));
    }

    #[test]
    fn test_rect_clip() {
        let mut r = RectI::new(-5, -5, 300, 12);
        assert!(r.clip(&RectI::new(0, 0, 279, 279)));
        assert_eq!(r, RectI::new(0, 0, 279, 12));

        let mut outside = RectI::new(300, 300, 310, 310);
        assert!(!outside.clip(&RectI::new(0, 0, 279, 279)));
    }

    #[test]
    fn test_rect_normalize() {
        let mut r = RectI::new(10, 8, 2, 1);
        r.normalize();
        assert_eq!(r, RectI::new(2, 1, 10, 8));
        assert!(r.hit_test(5, 5));
        assert!(!r.hit_test(11, 5));
    }

    #[test]
    fn test_point_distance_and_lerp() {
        let a = PointD::new(0.0, 0.0);
        let b = PointD::new(30.0, 40.0);
        assert_eq!(a.distance(&b), 50.0);
        assert_eq!(a.lerp(&b, 0.5), PointD::new(15.0, 20.0));
        assert_eq!(a.lerp(&b, 1.0), b);
    }
}
