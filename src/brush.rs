//! Soft 3×3 brush.
//!
//! The stencil weights and deposit gain approximate the anti-aliased strokes
//! of the MNIST training set. They must not drift: the classifier was tuned
//! against exactly this look.

use crate::basics::{cell_in_grid, cell_of, PointD, GRID_SIZE};
use crate::grid::IntensityGrid;

/// Scale applied to each stencil weight per deposit.
pub const DEPOSIT_GAIN: f64 = 0.15;

/// Center-weighted falloff used for every deposit.
pub const MNIST_STENCIL: [[f64; 3]; 3] = [
    [0.2, 0.5, 0.2],
    [0.5, 1.0, 0.5],
    [0.2, 0.5, 0.2],
];

/// Immutable 3×3 weight matrix plus the gain it is applied with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushStencil {
    weights: [[f64; 3]; 3],
    gain: f64,
}

impl BrushStencil {
    pub const fn mnist() -> Self {
        Self {
            weights: MNIST_STENCIL,
            gain: DEPOSIT_GAIN,
        }
    }

    pub fn weights(&self) -> &[[f64; 3]; 3] {
        &self.weights
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Add one brush deposit centred on the cell under the on-screen point.
    ///
    /// Stencil cells that fall outside the grid are skipped, as are points
    /// with non-finite coordinates. Each touched cell saturates at 1.0.
    pub fn deposit(&self, grid: &mut IntensityGrid, p: PointD) {
        let Some((cx, cy)) = cell_of(p) else {
            return;
        };
        let reach = -1..=GRID_SIZE as i32;
        if !(reach.contains(&cx) && reach.contains(&cy)) {
            return;
        }
        for (dy, row) in self.weights.iter().enumerate() {
            for (dx, &w) in row.iter().enumerate() {
                let x = cx + dx as i32 - 1;
                let y = cy + dy as i32 - 1;
                if cell_in_grid(x, y) {
                    let v = grid.cell_mut(x as usize, y as usize);
                    *v = (*v + w * self.gain).min(1.0);
                }
            }
        }
    }
}

impl Default for BrushStencil {
    fn default() -> Self {
        Self::mnist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_single_deposit_weights() {
        let mut g = IntensityGrid::new();
        BrushStencil::mnist().deposit(&mut g, PointD::new(105.0, 105.0));
        assert!(approx(g.get(10, 10), 0.15));
        assert!(approx(g.get(9, 10), 0.075));
        assert!(approx(g.get(11, 10), 0.075));
        assert!(approx(g.get(10, 9), 0.075));
        assert!(approx(g.get(9, 9), 0.03));
        assert!(approx(g.get(11, 11), 0.03));
        assert_eq!(g.get(12, 10), 0.0);
    }

    #[test]
    fn test_deposit_saturates() {
        let mut g = IntensityGrid::new();
        let brush = BrushStencil::mnist();
        let p = PointD::new(55.0, 55.0);
        let mut last = 0.0;
        for _ in 0..20 {
            brush.deposit(&mut g, p);
            let v = g.get(5, 5);
            assert!(v >= last);
            assert!(v <= 1.0);
            last = v;
        }
        assert_eq!(g.get(5, 5), 1.0);
        assert!(g.get(4, 4) < 1.0);
    }

    #[test]
    fn test_corner_partial_stencil() {
        let mut g = IntensityGrid::new();
        BrushStencil::mnist().deposit(&mut g, PointD::new(0.0, 0.0));
        assert!(approx(g.get(0, 0), 0.15));
        assert!(approx(g.get(1, 0), 0.075));
        assert!(approx(g.get(1, 1), 0.03));

        let mut g = IntensityGrid::new();
        BrushStencil::mnist().deposit(&mut g, PointD::new(279.0, 279.0));
        assert!(approx(g.get(GRID_SIZE - 1, GRID_SIZE - 1), 0.15));
    }

    #[test]
    fn test_deposit_outside_canvas() {
        let mut g = IntensityGrid::new();
        let brush = BrushStencil::mnist();
        // Centre one cell beyond the edge: only the inner stencil column lands.
        brush.deposit(&mut g, PointD::new(-5.0, 105.0));
        assert!(approx(g.get(0, 10), 0.075));
        assert!(approx(g.get(0, 9), 0.03));
        // Far away: nothing lands.
        brush.deposit(&mut g, PointD::new(1000.0, 1000.0));
        brush.deposit(&mut g, PointD::new(-50.0, -50.0));
        assert_eq!(g.iter_cells().filter(|c| c.2 > 0.0).count(), 3);

        // One cell past the far edge still reaches the last column.
        let mut g = IntensityGrid::new();
        brush.deposit(&mut g, PointD::new(285.0, 105.0));
        assert!(approx(g.get(GRID_SIZE - 1, 10), 0.075));
    }

    #[test]
    fn test_deposit_far_coordinates() {
        let mut g = IntensityGrid::new();
        let brush = BrushStencil::mnist();
        brush.deposit(&mut g, PointD::new(3.0e10, 5.0));
        brush.deposit(&mut g, PointD::new(5.0, -3.0e10));
        brush.deposit(&mut g, PointD::new(f64::MAX, f64::MIN));
        assert!(g.is_blank());
    }

    #[test]
    fn test_deposit_non_finite() {
        let mut g = IntensityGrid::new();
        let brush = BrushStencil::mnist();
        brush.deposit(&mut g, PointD::new(f64::NAN, f64::NAN));
        brush.deposit(&mut g, PointD::new(f64::INFINITY, 5.0));
        brush.deposit(&mut g, PointD::new(5.0, f64::NEG_INFINITY));
        assert!(g.is_blank());
    }
}
