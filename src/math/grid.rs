//! Square row-major grids used for every per-cell pipeline output.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// A square `side × side` grid stored row-major.
///
/// `x` is the column (maps to normalized `u`), `y` is the row (maps to `v`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    side: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `value`.
    pub fn filled(side: usize, value: T) -> Self {
        Self {
            side,
            cells: vec![value; side * side],
        }
    }
}

impl<T> Grid<T> {
    /// Build a grid by evaluating `f(x, y)` for every cell in row-major order.
    pub fn from_fn(side: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(side * side);
        for y in 0..side {
            for x in 0..side {
                cells.push(f(x, y));
            }
        }
        Self { side, cells }
    }

    /// Side length in cells.
    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at column `x`, row `y`, or `None` when out of range.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.side && y < self.side {
            self.cells.get(y * self.side + x)
        } else {
            None
        }
    }

    /// One row of the grid.
    pub fn row(&self, y: usize) -> &[T] {
        &self.cells[y * self.side..(y + 1) * self.side]
    }

    /// All cells, row-major.
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.cells.iter()
    }

    /// Apply `f` to every cell, producing a grid of the same size.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            side: self.side,
            cells: self.cells.iter().map(f).collect(),
        }
    }

    /// Normalized coordinate of a cell index along one axis, in [0, 1].
    #[inline]
    pub fn normalized_coord(&self, i: usize) -> f32 {
        normalized_coord(i, self.side)
    }
}

impl Grid<f32> {
    /// Bilinear sample at normalized position `(u, v)`, clamped to the grid.
    pub fn sample_bilinear(&self, u: f32, v: f32) -> f32 {
        if self.side == 1 {
            return self.cells[0];
        }
        let max = (self.side - 1) as f32;
        let fx = (u.clamp(0.0, 1.0) * max).min(max);
        let fy = (v.clamp(0.0, 1.0) * max).min(max);

        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(self.side - 1);
        let y1 = (y0 + 1).min(self.side - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let h00 = self[(x0, y0)];
        let h10 = self[(x1, y0)];
        let h01 = self[(x0, y1)];
        let h11 = self[(x1, y1)];

        let a = h00 + (h10 - h00) * tx;
        let b = h01 + (h11 - h01) * tx;
        a + (b - a) * ty
    }

    /// Smallest and largest cell values.
    pub fn min_max(&self) -> (f32, f32) {
        self.cells.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        &self.cells[y * self.side + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        &mut self.cells[y * self.side + x]
    }
}

/// Map cell index `i` of a `side`-cell axis onto [0, 1] (first and last cells hit the ends).
#[inline]
pub fn normalized_coord(i: usize, side: usize) -> f32 {
    if side <= 1 {
        0.0
    } else {
        i as f32 / (side - 1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_row_major() {
        let grid = Grid::from_fn(3, |x, y| y * 3 + x);
        assert_eq!(grid.side(), 3);
        assert_eq!(grid.len(), 9);
        assert_eq!(grid[(2, 0)], 2);
        assert_eq!(grid[(0, 1)], 3);
        assert_eq!(grid.row(2), &[6, 7, 8]);
    }

    #[test]
    fn test_get_out_of_range() {
        let grid = Grid::filled(2, 1.0f32);
        assert_eq!(grid.get(1, 1), Some(&1.0));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    #[test]
    fn test_bilinear_hits_cells_exactly() {
        let grid = Grid::from_fn(5, |x, y| (x + 10 * y) as f32);
        for y in 0..5 {
            for x in 0..5 {
                let s = grid.sample_bilinear(grid.normalized_coord(x), grid.normalized_coord(y));
                assert!((s - grid[(x, y)]).abs() < 1e-4, "({}, {}) -> {}", x, y, s);
            }
        }
    }

    #[test]
    fn test_bilinear_midpoint_and_clamp() {
        let grid = Grid::from_fn(2, |x, _| x as f32);
        assert!((grid.sample_bilinear(0.5, 0.5) - 0.5).abs() < 1e-6);
        assert_eq!(grid.sample_bilinear(-3.0, 0.0), 0.0);
        assert_eq!(grid.sample_bilinear(7.0, 1.0), 1.0);
    }

    #[test]
    fn test_min_max() {
        let grid = Grid::from_fn(3, |x, y| x as f32 - y as f32);
        assert_eq!(grid.min_max(), (-2.0, 2.0));
    }

    #[test]
    fn test_map_preserves_side() {
        let grid = Grid::filled(4, 2u8);
        let doubled = grid.map(|v| *v as u32 * 2);
        assert_eq!(doubled.side(), 4);
        assert!(doubled.iter().all(|&v| v == 4));
    }
}
