//! Rectangular cell regions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::GridShape;

/// Half-open rectangular block of cells `[j_start, j_end) × [i_start, i_end)`.
///
/// Used to describe the inner region of the two-level initial profile.
/// Bounds past the grid edge are clipped when the region is applied.
///
/// # Example
///
/// ```
/// use npzb_rs::types::{CellRegion, GridShape};
///
/// let inner = CellRegion::new(0, 10, 0, 25);
/// assert!(inner.contains(3, 24));
/// assert!(!inner.contains(3, 25));
///
/// let west = CellRegion::west_of(GridShape::new(20, 40), 15);
/// assert_eq!(west.n_cells(), 20 * 15);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRegion {
    /// First row (inclusive)
    pub j_start: usize,
    /// Last row (exclusive)
    pub j_end: usize,
    /// First column (inclusive)
    pub i_start: usize,
    /// Last column (exclusive)
    pub i_end: usize,
}

impl CellRegion {
    /// Create a new region.
    ///
    /// # Panics
    ///
    /// Panics if `j_end < j_start` or `i_end < i_start`.
    pub fn new(j_start: usize, j_end: usize, i_start: usize, i_end: usize) -> Self {
        assert!(
            j_end >= j_start,
            "j_end ({}) must not precede j_start ({})",
            j_end,
            j_start
        );
        assert!(
            i_end >= i_start,
            "i_end ({}) must not precede i_start ({})",
            i_end,
            i_start
        );
        Self {
            j_start,
            j_end,
            i_start,
            i_end,
        }
    }

    /// All columns west of `cutoff` over the full height of the grid.
    pub fn west_of(shape: GridShape, cutoff: usize) -> Self {
        Self::new(0, shape.ny(), 0, cutoff.min(shape.nx()))
    }

    /// Whether cell (j, i) lies inside the region.
    #[inline]
    pub fn contains(&self, j: usize, i: usize) -> bool {
        j >= self.j_start && j < self.j_end && i >= self.i_start && i < self.i_end
    }

    /// Clip the region to a grid.
    pub fn clipped(&self, shape: GridShape) -> Self {
        let j_end = self.j_end.min(shape.ny());
        let i_end = self.i_end.min(shape.nx());
        Self {
            j_start: self.j_start.min(j_end),
            j_end,
            i_start: self.i_start.min(i_end),
            i_end,
        }
    }

    /// Number of cells covered (before clipping).
    pub fn n_cells(&self) -> usize {
        (self.j_end - self.j_start) * (self.i_end - self.i_start)
    }

    /// Whether the region covers no cells.
    pub fn is_empty(&self) -> bool {
        self.n_cells() == 0
    }
}

impl fmt::Display for CellRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "j∈[{}, {}) i∈[{}, {})",
            self.j_start, self.j_end, self.i_start, self.i_end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let r = CellRegion::new(2, 4, 1, 3);
        assert!(r.contains(2, 1));
        assert!(r.contains(3, 2));
        assert!(!r.contains(4, 2));
        assert!(!r.contains(2, 0));
    }

    #[test]
    fn test_clipped() {
        let r = CellRegion::new(5, 100, 0, 100).clipped(GridShape::new(10, 8));
        assert_eq!(r, CellRegion::new(5, 10, 0, 8));
        let outside = CellRegion::new(20, 30, 0, 4).clipped(GridShape::new(10, 8));
        assert!(outside.is_empty());
    }

    #[test]
    fn test_west_of() {
        let r = CellRegion::west_of(GridShape::new(6, 10), 4);
        assert!(r.contains(5, 3));
        assert!(!r.contains(5, 4));
    }

    #[test]
    #[should_panic(expected = "must not precede")]
    fn test_inverted_rows() {
        CellRegion::new(4, 2, 0, 1);
    }
}
