//! Structured grid shape.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::CellIndex;

/// Shape of an Ny × Nx structured grid.
///
/// Rows (`j`) run south to north, columns (`i`) west to east. Cell data
/// is stored row-major, so the flat index is `j * nx + i`.
///
/// # Example
///
/// ```
/// use npzb_rs::types::GridShape;
///
/// let shape = GridShape::new(50, 100);
/// assert_eq!(shape.ny(), 50);
/// assert_eq!(shape.nx(), 100);
/// assert_eq!(shape.n_cells(), 5000);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    /// Number of rows (y-direction)
    ny: usize,
    /// Number of columns (x-direction)
    nx: usize,
}

impl GridShape {
    /// Create a new grid shape.
    ///
    /// # Panics
    ///
    /// Panics if either `ny` or `nx` is zero.
    pub fn new(ny: usize, nx: usize) -> Self {
        assert!(ny > 0, "ny must be positive, got {}", ny);
        assert!(nx > 0, "nx must be positive, got {}", nx);
        Self { ny, nx }
    }

    /// Number of rows.
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Number of columns.
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Total number of cells.
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.nx * self.ny
    }

    /// Flat index of cell (j, i).
    #[inline]
    pub fn cell(&self, j: usize, i: usize) -> CellIndex {
        debug_assert!(j < self.ny && i < self.nx);
        CellIndex::new(j * self.nx + i)
    }

    /// Row/column of a flat cell index.
    #[inline]
    pub fn row_col(&self, cell: CellIndex) -> (usize, usize) {
        (cell.get() / self.nx, cell.get() % self.nx)
    }

    /// Whether (j, i) lies on the outermost ring of cells.
    #[inline]
    pub fn is_boundary(&self, j: usize, i: usize) -> bool {
        j == 0 || i == 0 || j + 1 == self.ny || i + 1 == self.nx
    }

    /// Return as tuple (ny, nx).
    #[inline]
    pub fn as_tuple(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.ny, self.nx)
    }
}

impl From<(usize, usize)> for GridShape {
    fn from((ny, nx): (usize, usize)) -> Self {
        Self::new(ny, nx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_creation() {
        let s = GridShape::new(10, 20);
        assert_eq!(s.ny(), 10);
        assert_eq!(s.nx(), 20);
        assert_eq!(s.n_cells(), 200);
    }

    #[test]
    fn test_cell_round_trip() {
        let s = GridShape::new(4, 7);
        let c = s.cell(3, 5);
        assert_eq!(c.get(), 26);
        assert_eq!(s.row_col(c), (3, 5));
    }

    #[test]
    fn test_boundary_ring() {
        let s = GridShape::new(4, 5);
        assert!(s.is_boundary(0, 2));
        assert!(s.is_boundary(3, 2));
        assert!(s.is_boundary(2, 0));
        assert!(s.is_boundary(2, 4));
        assert!(!s.is_boundary(1, 1));
        assert!(!s.is_boundary(2, 3));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", GridShape::new(12, 30)), "12×30");
    }

    #[test]
    #[should_panic(expected = "nx must be positive")]
    fn test_zero_nx() {
        GridShape::new(10, 0);
    }
}
