//! Three-slot storage for one leapfrog field.

use crate::solver::TimeLevels;
use crate::types::{GridShape, N_SLOTS, SlotIndex};

/// Mutable views of the three time levels of a field.
pub struct LevelsMut<'a> {
    /// Time level n - 1
    pub prev: &'a mut [f64],
    /// Time level n
    pub cur: &'a mut [f64],
    /// Time level n + 1
    pub next: &'a mut [f64],
}

/// A scalar field stored as three Ny×Nx buffers, one per time level.
///
/// Buffers are allocated once. Which buffer plays which role is decided by
/// a [`TimeLevels`] triple held outside the field.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarField {
    shape: GridShape,
    slots: [Vec<f64>; N_SLOTS],
}

impl ScalarField {
    /// All three slots filled with `value`.
    pub fn filled(shape: GridShape, value: f64) -> Self {
        let n = shape.n_cells();
        Self {
            shape,
            slots: [vec![value; n], vec![value; n], vec![value; n]],
        }
    }

    /// Grid shape.
    #[inline]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Values in one slot, row-major.
    #[inline]
    pub fn slot(&self, slot: SlotIndex) -> &[f64] {
        &self.slots[slot.get()]
    }

    /// Mutable values in one slot.
    #[inline]
    pub fn slot_mut(&mut self, slot: SlotIndex) -> &mut [f64] {
        &mut self.slots[slot.get()]
    }

    /// Copy one slot into another.
    pub fn copy_slot(&mut self, from: SlotIndex, to: SlotIndex) {
        if from == to {
            return;
        }
        let [s0, s1, s2] = &mut self.slots;
        let (src, dst) = match (from.get(), to.get()) {
            (0, 1) => (s0, s1),
            (0, _) => (s0, s2),
            (1, 0) => (s1, s0),
            (1, _) => (s1, s2),
            (_, 0) => (s2, s0),
            _ => (s2, s1),
        };
        dst.copy_from_slice(src);
    }

    /// Borrow all three levels at once, arranged by role.
    pub fn levels_mut(&mut self, levels: TimeLevels) -> LevelsMut<'_> {
        let [s0, s1, s2] = &mut self.slots;
        let (prev, cur, next) = match (levels.prev().get(), levels.cur().get()) {
            (0, 1) => (s0, s1, s2),
            (1, 2) => (s1, s2, s0),
            (2, 0) => (s2, s0, s1),
            (0, _) => (s0, s2, s1),
            (1, _) => (s1, s0, s2),
            _ => (s2, s1, s0),
        };
        LevelsMut {
            prev: prev.as_mut_slice(),
            cur: cur.as_mut_slice(),
            next: next.as_mut_slice(),
        }
    }

    /// Apply `f` to every slot.
    pub fn for_each_slot_mut(&mut self, mut f: impl FnMut(&mut [f64])) {
        for slot in self.slots.iter_mut() {
            f(slot);
        }
    }
}
