//! Rotating roles of the three leapfrog time levels.

use std::fmt;

use crate::types::SlotIndex;

/// Which slot currently plays the previous, current and next role.
///
/// The three slots are always a permutation of {0, 1, 2}. Rotation only
/// relabels them; field data never moves.
///
/// # Example
///
/// ```
/// use npzb_rs::solver::TimeLevels;
///
/// let mut levels = TimeLevels::new();
/// assert_eq!(levels.as_tuple(), (0, 1, 2));
/// levels.rotate();
/// assert_eq!(levels.as_tuple(), (1, 2, 0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeLevels {
    prev: SlotIndex,
    cur: SlotIndex,
    next: SlotIndex,
}

impl Default for TimeLevels {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeLevels {
    /// Initial assignment: prev = 0, cur = 1, next = 2.
    pub const fn new() -> Self {
        Self {
            prev: SlotIndex::new(0),
            cur: SlotIndex::new(1),
            next: SlotIndex::new(2),
        }
    }

    /// Slot holding time level n - 1.
    #[inline]
    pub fn prev(&self) -> SlotIndex {
        self.prev
    }

    /// Slot holding time level n.
    #[inline]
    pub fn cur(&self) -> SlotIndex {
        self.cur
    }

    /// Slot receiving time level n + 1.
    #[inline]
    pub fn next(&self) -> SlotIndex {
        self.next
    }

    /// (prev, cur, next) -> (cur, next, prev).
    #[inline]
    pub fn rotate(&mut self) {
        *self = Self {
            prev: self.cur,
            cur: self.next,
            next: self.prev,
        };
    }

    /// Raw slot numbers as (prev, cur, next).
    pub fn as_tuple(&self) -> (usize, usize, usize) {
        (self.prev.get(), self.cur.get(), self.next.get())
    }
}

impl fmt::Display for TimeLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(prev {}, cur {}, next {})", self.prev, self.cur, self.next)
    }
}
