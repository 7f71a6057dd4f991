//! Stroke rasterizer: turns a pointer path into brush deposits.
//!
//! Pointer events arrive at whatever rate the platform delivers them, so a
//! fast drag can jump several cells between two samples. Each segment is
//! subdivided into steps of at most [`STROKE_STEP`] on-screen pixels and the
//! brush is deposited at every step, endpoints included.

use log::debug;

use crate::basics::{PointD, STROKE_STEP};
use crate::brush::BrushStencil;
use crate::grid::IntensityGrid;

// ============================================================================
// Segment interpolation
// ============================================================================

/// Upper bound on subdivisions of one segment. Reached only by segments
/// thousands of canvases long.
pub const MAX_STROKE_STEPS: u32 = 4096;

/// Evenly spaced points along a segment, both endpoints included.
///
/// Yields `steps + 1` points where `steps = max(floor(d / STROKE_STEP), 1)`,
/// capped at [`MAX_STROKE_STEPS`].
#[derive(Debug, Clone)]
pub struct StrokeInterpolator {
    from: PointD,
    to: PointD,
    steps: u32,
    i: u32,
}

impl StrokeInterpolator {
    pub fn new(from: PointD, to: PointD) -> Self {
        Self {
            from,
            to,
            steps: Self::step_count(from.distance(&to)),
            i: 0,
        }
    }

    /// Number of subdivisions for a segment of on-screen length `d`.
    pub fn step_count(d: f64) -> u32 {
        let steps = (d / STROKE_STEP).floor();
        if steps.is_finite() && steps >= 1.0 {
            steps.min(MAX_STROKE_STEPS as f64) as u32
        } else {
            1
        }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }
}

impl Iterator for StrokeInterpolator {
    type Item = PointD;

    fn next(&mut self) -> Option<PointD> {
        if self.i > self.steps {
            return None;
        }
        let t = self.i as f64 / self.steps as f64;
        self.i += 1;
        Some(self.from.lerp(&self.to, t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.steps + 1).saturating_sub(self.i) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for StrokeInterpolator {}

// ============================================================================
// StrokeRasterizer
// ============================================================================

/// One drawing session: owns the grid and the active stroke anchor.
#[derive(Debug, Clone, Default)]
pub struct StrokeRasterizer {
    grid: IntensityGrid,
    brush: BrushStencil,
    anchor: Option<PointD>,
}

impl StrokeRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid(grid: IntensityGrid) -> Self {
        Self {
            grid,
            ..Self::default()
        }
    }

    pub fn grid(&self) -> &IntensityGrid {
        &self.grid
    }

    pub fn into_grid(self) -> IntensityGrid {
        self.grid
    }

    pub fn brush(&self) -> &BrushStencil {
        &self.brush
    }

    pub fn is_drawing(&self) -> bool {
        self.anchor.is_some()
    }

    /// Start a stroke at `p` and deposit the brush once there.
    pub fn begin_stroke(&mut self, p: PointD) {
        debug!("stroke begin at ({:.1}, {:.1})", p.x, p.y);
        self.anchor = Some(p);
        self.brush.deposit(&mut self.grid, p);
    }

    /// Extend the active stroke to `p`.
    ///
    /// Returns the number of brush deposits made; 0 when no stroke is active.
    pub fn continue_stroke(&mut self, p: PointD) -> usize {
        let Some(from) = self.anchor else {
            return 0;
        };
        let mut count = 0;
        for q in StrokeInterpolator::new(from, p) {
            self.brush.deposit(&mut self.grid, q);
            count += 1;
        }
        self.anchor = Some(p);
        count
    }

    pub fn end_stroke(&mut self) {
        if self.anchor.take().is_some() {
            debug!("stroke end");
        }
    }

    /// Zero the grid. An active stroke stays active.
    pub fn reset(&mut self) {
        self.grid.reset();
    }

    /// Replace the grid wholesale, e.g. with a preset example.
    pub fn load_preset(&mut self, grid: IntensityGrid) {
        debug!("loading preset grid (max={:.2})", grid.max_value());
        self.grid = grid;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn in_range(g: &IntensityGrid) -> bool {
        g.iter_cells().all(|(_, _, v)| (0.0..=1.0).contains(&v))
    }

    #[test]
    fn test_step_count() {
        assert_eq!(StrokeInterpolator::step_count(0.0), 1);
        assert_eq!(StrokeInterpolator::step_count(6.9), 1);
        assert_eq!(StrokeInterpolator::step_count(7.0), 1);
        assert_eq!(StrokeInterpolator::step_count(14.0), 2);
        assert_eq!(StrokeInterpolator::step_count(20.9), 2);
        assert_eq!(StrokeInterpolator::step_count(70.0), 10);
        assert_eq!(StrokeInterpolator::step_count(f64::NAN), 1);
        assert_eq!(StrokeInterpolator::step_count(f64::INFINITY), 1);
        assert_eq!(StrokeInterpolator::step_count(3.0e10), MAX_STROKE_STEPS);
    }

    #[test]
    fn test_interpolator_evenly_spaced() {
        let pts: Vec<PointD> =
            StrokeInterpolator::new(PointD::new(0.0, 0.0), PointD::new(70.0, 0.0)).collect();
        assert_eq!(pts.len(), 11);
        for (i, p) in pts.iter().enumerate() {
            assert!((p.x - 7.0 * i as f64).abs() < 1e-9);
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn test_interpolator_exact_size() {
        let it = StrokeInterpolator::new(PointD::new(0.0, 0.0), PointD::new(30.0, 40.0));
        assert_eq!(it.steps(), 7);
        assert_eq!(it.len(), 8);
    }

    #[test]
    fn test_continue_stroke_deposit_count() {
        let mut r = StrokeRasterizer::new();
        r.begin_stroke(PointD::new(10.0, 100.0));
        assert_eq!(r.continue_stroke(PointD::new(80.0, 100.0)), 11);
        // A tiny move still deposits at both ends.
        assert_eq!(r.continue_stroke(PointD::new(81.0, 100.0)), 2);
    }

    #[test]
    fn test_continue_without_stroke_is_noop() {
        let mut r = StrokeRasterizer::new();
        assert_eq!(r.continue_stroke(PointD::new(50.0, 50.0)), 0);
        assert!(r.grid().is_blank());

        r.begin_stroke(PointD::new(50.0, 50.0));
        r.end_stroke();
        let before = r.grid().clone();
        assert_eq!(r.continue_stroke(PointD::new(150.0, 150.0)), 0);
        assert_eq!(r.grid(), &before);
        assert!(!r.is_drawing());
    }

    #[test]
    fn test_fast_stroke_has_no_gap() {
        let mut r = StrokeRasterizer::new();
        r.begin_stroke(PointD::new(5.0, 145.0));
        r.continue_stroke(PointD::new(275.0, 145.0));
        for x in 0..28 {
            assert!(r.grid().get(x, 14) > 0.0, "gap at column {}", x);
        }
    }

    #[test]
    fn test_cells_stay_in_range() {
        let mut r = StrokeRasterizer::new();
        r.begin_stroke(PointD::new(-30.0, -30.0));
        for i in 0..50 {
            let t = i as f64;
            r.continue_stroke(PointD::new(t * 7.3 % 320.0 - 20.0, t * 13.1 % 310.0 - 15.0));
            r.continue_stroke(PointD::new(140.0, 140.0));
        }
        assert!(in_range(r.grid()));
        assert_eq!(r.grid().get(14, 14), 1.0);
    }

    #[test]
    fn test_wild_pointer_coordinates() {
        let mut r = StrokeRasterizer::new();
        r.begin_stroke(PointD::new(3.0e10, 5.0));
        assert!(r.grid().is_blank());
        assert_eq!(
            r.continue_stroke(PointD::new(3.0e10, 6.0e10)),
            MAX_STROKE_STEPS as usize + 1
        );
        assert!(r.grid().is_blank());
        r.end_stroke();

        r.begin_stroke(PointD::new(f64::NAN, f64::NAN));
        assert_eq!(r.continue_stroke(PointD::new(f64::NAN, 50.0)), 2);
        r.end_stroke();
        assert!(r.grid().is_blank());
        assert_eq!(r.grid().get(0, 0), 0.0);
    }

    #[test]
    fn test_reset_and_preset() {
        let mut r = StrokeRasterizer::new();
        r.begin_stroke(PointD::new(100.0, 100.0));
        r.reset();
        assert!(r.grid().is_blank());

        let mut preset = IntensityGrid::new();
        *preset.cell_mut(3, 3) = 0.7;
        r.load_preset(preset.clone());
        assert_eq!(r.grid(), &preset);
        assert_eq!(r.into_grid(), preset);
    }
}
