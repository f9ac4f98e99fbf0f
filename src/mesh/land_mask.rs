//! Land/sea masking for structured grids.
//!
//! Classifies each cell of an Ny × Nx grid as sea (computed) or land
//! (excluded). The mask is fixed for the duration of a run and is shared
//! by the forcing, the model state and every output snapshot.
//!
//! # Example
//!
//! ```
//! use npzb_rs::mesh::SeaMask;
//! use npzb_rs::types::GridShape;
//!
//! // Closed basin: land on the outer ring, sea inside
//! let mask = SeaMask::closed_basin(GridShape::new(5, 6));
//! assert!(mask.is_land(0, 3));
//! assert!(mask.is_sea(2, 3));
//! assert_eq!(mask.sea_count(), 3 * 4);
//! ```

use crate::error::{NpzbError, Result};
use crate::types::{CellIndex, GridShape};

/// Land/sea mask for grid cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeaMask {
    /// Grid shape
    shape: GridShape,
    /// True if cell is sea (computed), false if land
    sea: Vec<bool>,
}

impl SeaMask {
    /// Create a mask where all cells are sea.
    pub fn all_sea(shape: GridShape) -> Self {
        Self {
            shape,
            sea: vec![true; shape.n_cells()],
        }
    }

    /// Create a mask where all cells are land.
    pub fn all_land(shape: GridShape) -> Self {
        Self {
            shape,
            sea: vec![false; shape.n_cells()],
        }
    }

    /// Create a mask with land on the outermost ring and sea elsewhere.
    pub fn closed_basin(shape: GridShape) -> Self {
        let mut mask = Self::all_sea(shape);
        for j in 0..shape.ny() {
            for i in 0..shape.nx() {
                if shape.is_boundary(j, i) {
                    mask.set_sea(j, i, false);
                }
            }
        }
        mask
    }

    /// Create a mask from per-cell flags (row-major, true = sea).
    pub fn from_flags(shape: GridShape, sea: Vec<bool>) -> Result<Self> {
        if sea.len() != shape.n_cells() {
            return Err(NpzbError::LengthMismatch {
                what: "mask",
                expected: shape.n_cells(),
                found: sea.len(),
            });
        }
        Ok(Self { shape, sea })
    }

    /// Create a mask from numeric values as stored in forcing datasets.
    ///
    /// A cell is sea when its value is finite and non-zero (1 = sea, 0 = land).
    pub fn from_values(shape: GridShape, values: &[f64]) -> Result<Self> {
        let sea = values.iter().map(|&v| v.is_finite() && v != 0.0).collect();
        Self::from_flags(shape, sea)
    }

    /// Grid shape.
    #[inline]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Check if cell (j, i) is sea.
    #[inline]
    pub fn is_sea(&self, j: usize, i: usize) -> bool {
        self.sea[j * self.shape.nx() + i]
    }

    /// Check if cell (j, i) is land.
    #[inline]
    pub fn is_land(&self, j: usize, i: usize) -> bool {
        !self.is_sea(j, i)
    }

    /// Check a flat cell index.
    #[inline]
    pub fn is_sea_cell(&self, cell: CellIndex) -> bool {
        self.sea[cell]
    }

    /// Raw per-cell flags (row-major).
    #[inline]
    pub fn flags(&self) -> &[bool] {
        &self.sea
    }

    /// Set the sea status of a cell.
    pub fn set_sea(&mut self, j: usize, i: usize, is_sea: bool) {
        let nx = self.shape.nx();
        self.sea[j * nx + i] = is_sea;
    }

    /// Number of sea cells.
    pub fn sea_count(&self) -> usize {
        self.sea.iter().filter(|&&s| s).count()
    }

    /// Number of land cells.
    pub fn land_count(&self) -> usize {
        self.sea.len() - self.sea_count()
    }

    /// Iterate over sea cells.
    pub fn sea_cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.sea
            .iter()
            .enumerate()
            .filter_map(|(k, &s)| if s { Some(CellIndex::new(k)) } else { None })
    }

    /// Number of sea cells that can be updated by a one-cell-halo stencil.
    pub fn interior_sea_count(&self) -> usize {
        self.sea_cells()
            .filter(|&c| {
                let (j, i) = self.shape.row_col(c);
                !self.shape.is_boundary(j, i)
            })
            .count()
    }

    /// Number of cells whose classification differs from `other`.
    ///
    /// Returns `None` when the shapes differ.
    pub fn count_differences(&self, other: &SeaMask) -> Option<usize> {
        if self.shape != other.shape {
            return None;
        }
        Some(
            self.sea
                .iter()
                .zip(other.sea.iter())
                .filter(|(a, b)| a != b)
                .count(),
        )
    }

    /// Get statistics about the mask.
    pub fn statistics(&self) -> SeaMaskStatistics {
        let sea_cells = self.sea_count();
        SeaMaskStatistics {
            total_cells: self.shape.n_cells(),
            sea_cells,
            land_cells: self.shape.n_cells() - sea_cells,
            interior_sea_cells: self.interior_sea_count(),
        }
    }
}

/// Statistics about a sea mask.
#[derive(Debug, Clone)]
pub struct SeaMaskStatistics {
    /// Total number of cells
    pub total_cells: usize,
    /// Number of sea cells
    pub sea_cells: usize,
    /// Number of land cells
    pub land_cells: usize,
    /// Sea cells away from the outer ring (updated by the integrator)
    pub interior_sea_cells: usize,
}

impl std::fmt::Display for SeaMaskStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Sea Mask Statistics:")?;
        writeln!(f, "  Total cells: {}", self.total_cells)?;
        writeln!(
            f,
            "  Sea cells: {} ({:.1}%)",
            self.sea_cells,
            100.0 * self.sea_cells as f64 / self.total_cells as f64
        )?;
        writeln!(
            f,
            "  Land cells: {} ({:.1}%)",
            self.land_cells,
            100.0 * self.land_cells as f64 / self.total_cells as f64
        )?;
        write!(f, "  Interior sea cells: {}", self.interior_sea_cells)
    }
}
