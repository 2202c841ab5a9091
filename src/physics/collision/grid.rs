//! Uniform grid over the simulation area for finding particles close to each other.

use crate::{math::Vec2, physics::ParticleKey};

use itertools::iproduct;

/// Upper limit for the total number of cells in a grid.
pub const MAX_GRID_CELLS: usize = 1 << 20;

/// A uniform grid of square cells holding particle keys.
///
/// The grid covers `[0, width] x [0, height]`. Positions outside of it
/// are clamped to the nearest edge cell rather than wrapping around,
/// so the grid still works (if slowly) for objects that escape the area.
///
/// Cells hold keys only and the grid is meant to be cleared and refilled every step.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    cell_size: f32,
    column_count: usize,
    row_count: usize,
    // column-major, index with `col * row_count + row`
    cells: Vec<Vec<ParticleKey>>,
}

impl SpatialGrid {
    /// Create a grid covering the given area.
    ///
    /// `cell_size` should be at least the diameter of the largest particle,
    /// otherwise some overlapping pairs can be missed.
    ///
    /// Dimensions rejected by [`dimensions`][Self::dimensions]
    /// give a single cell holding everything, which still finds every pair.
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        let (column_count, row_count) = Self::dimensions(width, height, cell_size)
            .unwrap_or_else(|| {
                log::warn!(
                    "Spatial grid of {width}x{height} with cell size {cell_size} is unusable, \
                    falling back to a single cell"
                );
                (1, 1)
            });
        Self {
            cell_size,
            column_count,
            row_count,
            cells: vec![Vec::new(); column_count * row_count],
        }
    }

    /// Column and row counts of a grid covering the given area,
    /// or `None` if it would have more than [`MAX_GRID_CELLS`] cells
    /// or any of the values is negative or not finite.
    pub fn dimensions(width: f32, height: f32, cell_size: f32) -> Option<(usize, usize)> {
        let axis = |len: f32| {
            let count = (len / cell_size).floor();
            (count.is_finite() && count >= 0.0 && count < MAX_GRID_CELLS as f32)
                .then(|| count as usize + 1)
        };
        let (column_count, row_count) = (axis(width)?, axis(height)?);
        column_count
            .checked_mul(row_count)
            .filter(|&total| total <= MAX_GRID_CELLS)?;
        Some((column_count, row_count))
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Remove every key while keeping the allocated cells.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Column and row of the cell a point falls in, clamped to the grid.
    pub fn cell_coords(&self, point: Vec2) -> (usize, usize) {
        let clamp = |coord: f32, count: usize| -> usize {
            let idx = (coord / self.cell_size).floor();
            // float to int casts saturate, NaN becomes 0
            (idx.max(0.0) as usize).min(count - 1)
        };
        (
            clamp(point.x, self.column_count),
            clamp(point.y, self.row_count),
        )
    }

    pub fn insert(&mut self, key: ParticleKey, position: Vec2) {
        let (col, row) = self.cell_coords(position);
        self.cells[col * self.row_count + row].push(key);
    }

    /// All keys in the cell of `position` and its eight neighbours.
    pub fn query(&self, position: Vec2) -> impl Iterator<Item = ParticleKey> + '_ {
        let (col, row) = self.cell_coords(position);
        let cols = col.saturating_sub(1)..=(col + 1).min(self.column_count - 1);
        let rows = row.saturating_sub(1)..=(row + 1).min(self.row_count - 1);
        iproduct!(cols, rows)
            .flat_map(move |(c, r)| self.cells[c * self.row_count + r].iter().copied())
    }
}
