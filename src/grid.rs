//! The 28×28 intensity grid a drawing accumulates into.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::basics::GRID_SIZE;
use crate::error::{Result, SketchError};

/// Fixed-size square matrix of intensities, row-major (`cells[y][x]`).
///
/// Brush deposits keep every cell within `[0, 1]`. Grids built with
/// [`IntensityGrid::from_rows`] are taken as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityGrid {
    cells: [[f64; GRID_SIZE]; GRID_SIZE],
}

impl IntensityGrid {
    /// An all-zero grid.
    pub fn new() -> Self {
        Self {
            cells: [[0.0; GRID_SIZE]; GRID_SIZE],
        }
    }

    /// Build a grid from nested rows. The shape must be exactly 28×28;
    /// values are not revalidated.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let bad_row = rows.iter().position(|r| r.len() != GRID_SIZE);
        if rows.len() != GRID_SIZE || bad_row.is_some() {
            return Err(SketchError::GridShape {
                expected: GRID_SIZE,
                rows: rows.len(),
                bad_row,
            });
        }
        let mut grid = Self::new();
        for (dst, src) in grid.cells.iter_mut().zip(rows) {
            dst.copy_from_slice(src);
        }
        Ok(grid)
    }

    pub const fn from_array(cells: [[f64; GRID_SIZE]; GRID_SIZE]) -> Self {
        Self { cells }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.cells[y][x]
    }

    #[inline]
    pub fn cell_mut(&mut self, x: usize, y: usize) -> &mut f64 {
        &mut self.cells[y][x]
    }

    pub fn rows(&self) -> &[[f64; GRID_SIZE]; GRID_SIZE] {
        &self.cells
    }

    /// Copy into nested vectors, the shape the classification request uses.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.cells.iter().map(|r| r.to_vec()).collect()
    }

    /// Set every cell to zero.
    pub fn reset(&mut self) {
        self.cells = [[0.0; GRID_SIZE]; GRID_SIZE];
    }

    pub fn max_value(&self) -> f64 {
        self.cells
            .iter()
            .flatten()
            .copied()
            .fold(0.0, f64::max)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().flatten().all(|&v| v <= 0.0)
    }

    /// Iterate `(x, y, value)` over every cell, row by row.
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(y, row)| row.iter().enumerate().map(move |(x, &v)| (x, y, v)))
    }
}

impl Default for IntensityGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for IntensityGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.cells.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for IntensityGrid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let rows = Vec::<Vec<f64>>::deserialize(deserializer)?;
        Self::from_rows(&rows).map_err(serde::de::Error::custom)
    }
}
