//! Strongly-typed index newtypes.
//!
//! These types prevent mixing up different kinds of indices
//! (flat grid cell vs time-level slot vs forcing sample).

use std::fmt;

/// Macro to generate index newtypes with common functionality.
macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Create a new index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Get the raw index value.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// First index (0).
            pub const ZERO: Self = Self(0);

            /// Create an iterator over [0, n).
            pub fn iter(n: usize) -> impl Iterator<Item = $name> + ExactSizeIterator {
                (0..n).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        // Allow using as array index
        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }
    };
}

define_index!(
    /// Flat (row-major) cell index in an Ny × Nx grid.
    ///
    /// # Example
    ///
    /// ```
    /// use npzb_rs::types::{CellIndex, GridShape};
    ///
    /// let shape = GridShape::new(4, 5);
    /// let cell = shape.cell(2, 3);
    /// assert_eq!(cell, CellIndex::new(13));
    /// ```
    CellIndex,
    "C"
);

define_index!(
    /// One of the three time-level buffers of a leapfrog field.
    SlotIndex,
    "S"
);

define_index!(
    /// Sample index into a forcing time series.
    ForcingIndex,
    "K"
);

/// Number of time-level slots held per field.
pub const N_SLOTS: usize = 3;

impl SlotIndex {
    /// Slot following this one, wrapping with period [`N_SLOTS`].
    #[inline]
    pub fn following(self) -> Self {
        Self((self.0 + 1) % N_SLOTS)
    }
}

impl ForcingIndex {
    /// Next forcing sample.
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_index() {
        let idx = CellIndex::new(42);
        assert_eq!(idx.get(), 42);
        assert_eq!(usize::from(idx), 42);
    }

    #[test]
    fn test_slot_wraps() {
        let s = SlotIndex::new(2);
        assert_eq!(s.following(), SlotIndex::ZERO);
        assert_eq!(SlotIndex::ZERO.following().following(), SlotIndex::new(2));
    }

    #[test]
    fn test_array_indexing() {
        let mut data = vec![10, 20, 30];
        data[SlotIndex::new(1)] = 25;
        assert_eq!(data[SlotIndex::new(1)], 25);
        assert_eq!(data[CellIndex::new(2)], 30);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CellIndex::new(7)), "C7");
        assert_eq!(format!("{}", SlotIndex::new(1)), "S1");
        assert_eq!(format!("{}", ForcingIndex::new(3)), "K3");
    }

    #[test]
    fn test_iter() {
        let slots: Vec<_> = SlotIndex::iter(N_SLOTS).collect();
        assert_eq!(slots, vec![SlotIndex::new(0), SlotIndex::new(1), SlotIndex::new(2)]);
    }
}
