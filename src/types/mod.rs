//! Strongly-typed domain types for safer APIs.
//!
//! - **Index newtypes**: `CellIndex`, `SlotIndex` and `ForcingIndex` cannot be mixed up
//! - **Grid shape**: `GridShape { ny, nx }` with row-major cell indexing
//! - **Regions**: `CellRegion` for rectangular blocks of cells
//!
//! # Example
//!
//! ```
//! use npzb_rs::types::{CellRegion, GridShape, SlotIndex};
//!
//! let shape = GridShape::new(30, 60);
//! let inner = CellRegion::west_of(shape, 20);
//! assert!(inner.contains(10, 5));
//!
//! let slot = SlotIndex::new(2);
//! assert_eq!(slot.following(), SlotIndex::ZERO);
//! ```

mod indices;
mod region;
mod shape;

pub use indices::{CellIndex, ForcingIndex, N_SLOTS, SlotIndex};
pub use region::CellRegion;
pub use shape::GridShape;
