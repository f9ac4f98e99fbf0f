//! Masked NPZB model state.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::field::ScalarField;
use crate::error::Result;
use crate::mesh::{MaskedField, SeaMask};
use crate::solver::TimeLevels;
use crate::types::{CellRegion, GridShape, N_SLOTS, SlotIndex};

/// The four state variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tracer {
    /// Dissolved nutrient
    N,
    /// Phytoplankton
    P,
    /// Zooplankton
    Z,
    /// Benthic reservoir
    B,
}

impl Tracer {
    /// All variables, in storage order.
    pub const ALL: [Tracer; 4] = [Tracer::N, Tracer::P, Tracer::Z, Tracer::B];

    /// Variables carried by the flow and filtered against the computational mode.
    pub const TRANSPORTED: [Tracer; 3] = [Tracer::N, Tracer::P, Tracer::Z];

    /// Storage position.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// One-letter symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Tracer::N => "N",
            Tracer::P => "P",
            Tracer::Z => "Z",
            Tracer::B => "B",
        }
    }

    /// Descriptive name.
    pub fn long_name(self) -> &'static str {
        match self {
            Tracer::N => "nutrient",
            Tracer::P => "phytoplankton",
            Tracer::Z => "zooplankton",
            Tracer::B => "benthos",
        }
    }
}

impl fmt::Display for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Two-region step profile used for initialization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientSpec {
    /// Level inside `region`
    pub inside: f64,
    /// Level outside `region`
    pub outside: f64,
    /// Rectangular inner region
    pub region: CellRegion,
}

impl GradientSpec {
    /// Same level everywhere.
    pub fn uniform(level: f64) -> Self {
        Self {
            inside: level,
            outside: level,
            region: CellRegion::new(0, 0, 0, 0),
        }
    }

    /// Level at (j, i).
    #[inline]
    pub fn value_at(&self, j: usize, i: usize) -> f64 {
        if self.region.contains(j, i) {
            self.inside
        } else {
            self.outside
        }
    }
}

/// N, P, Z and B on a shared masked grid, each with three time levels.
///
/// Land cells hold NaN internally and are only ever exposed as `None`.
///
/// # Example
///
/// ```
/// use npzb_rs::mesh::SeaMask;
/// use npzb_rs::solver::{GradientSpec, NPZBState, Tracer};
/// use npzb_rs::types::{CellRegion, GridShape, SlotIndex};
///
/// let mask = SeaMask::closed_basin(GridShape::new(5, 8));
/// let mut state = NPZBState::new(mask);
/// state.initialize(
///     Tracer::N,
///     &GradientSpec { inside: 4.0, outside: 1.0, region: CellRegion::new(0, 5, 0, 4) },
/// );
///
/// assert_eq!(state.get(Tracer::N, SlotIndex::new(2), 2, 1), Some(4.0));
/// assert_eq!(state.get(Tracer::N, SlotIndex::new(0), 2, 6), Some(1.0));
/// assert_eq!(state.get(Tracer::N, SlotIndex::new(0), 0, 0), None); // land
/// ```
#[derive(Clone, Debug)]
pub struct NPZBState {
    mask: SeaMask,
    fields: [ScalarField; 4],
    levels: TimeLevels,
}

impl NPZBState {
    /// Create a state with every sea value zero.
    pub fn new(mask: SeaMask) -> Self {
        let shape = mask.shape();
        let mut state = Self {
            fields: std::array::from_fn(|_| ScalarField::filled(shape, 0.0)),
            mask,
            levels: TimeLevels::new(),
        };
        for tracer in Tracer::ALL {
            state.initialize(tracer, &GradientSpec::uniform(0.0));
        }
        state
    }

    /// Grid shape.
    #[inline]
    pub fn shape(&self) -> GridShape {
        self.mask.shape()
    }

    /// Land/sea mask.
    #[inline]
    pub fn mask(&self) -> &SeaMask {
        &self.mask
    }

    /// Current role of each slot.
    #[inline]
    pub fn levels(&self) -> TimeLevels {
        self.levels
    }

    /// Storage of one variable.
    #[inline]
    pub fn field(&self, tracer: Tracer) -> &ScalarField {
        &self.fields[tracer.index()]
    }

    /// Mutable storage of one variable.
    #[inline]
    pub fn field_mut(&mut self, tracer: Tracer) -> &mut ScalarField {
        &mut self.fields[tracer.index()]
    }

    /// Fill slot 0 with the step profile, then copy it into slots 1 and 2.
    pub fn initialize(&mut self, tracer: Tracer, spec: &GradientSpec) {
        let shape = self.shape();
        let nx = shape.nx();
        let sea = self.mask.flags();
        let field = &mut self.fields[tracer.index()];

        let slot0 = field.slot_mut(SlotIndex::ZERO);
        for (k, value) in slot0.iter_mut().enumerate() {
            *value = if sea[k] {
                spec.value_at(k / nx, k % nx)
            } else {
                f64::NAN
            };
        }
        for s in SlotIndex::iter(N_SLOTS).skip(1) {
            field.copy_slot(SlotIndex::ZERO, s);
        }
    }

    /// Raise every sea value below `floor` to `floor`, in all three slots.
    ///
    /// Idempotent; land cells are untouched.
    pub fn clamp_min(&mut self, tracer: Tracer, floor: f64) {
        let sea = self.mask.flags();
        self.fields[tracer.index()].for_each_slot_mut(|values| {
            for (v, &is_sea) in values.iter_mut().zip(sea.iter()) {
                if is_sea && *v < floor {
                    *v = floor;
                }
            }
        });
    }

    /// Advance the slot roles: (prev, cur, next) -> (cur, next, prev).
    #[inline]
    pub fn rotate(&mut self) {
        self.levels.rotate();
    }

    /// Value at (j, i) in a slot, `None` on land.
    #[inline]
    pub fn get(&self, tracer: Tracer, slot: SlotIndex, j: usize, i: usize) -> Option<f64> {
        if self.mask.is_sea(j, i) {
            Some(self.fields[tracer.index()].slot(slot)[j * self.shape().nx() + i])
        } else {
            None
        }
    }

    /// Value at (j, i) in a slot, substituting `fallback` on land.
    #[inline]
    pub fn value_or(&self, tracer: Tracer, slot: SlotIndex, j: usize, i: usize, fallback: f64) -> f64 {
        self.get(tracer, slot, j, i).unwrap_or(fallback)
    }

    /// Mean over sea cells, `None` if there are none.
    pub fn mean(&self, tracer: Tracer, slot: SlotIndex) -> Option<f64> {
        masked_mean(self.fields[tracer.index()].slot(slot), self.mask.flags())
    }

    /// Sum over sea cells.
    pub fn sum(&self, tracer: Tracer, slot: SlotIndex) -> f64 {
        self.fields[tracer.index()]
            .slot(slot)
            .iter()
            .zip(self.mask.flags())
            .filter(|(_, sea)| **sea)
            .map(|(v, _)| v)
            .sum()
    }

    /// Owned copy of one slot with land marked missing.
    pub fn snapshot(&self, tracer: Tracer, slot: SlotIndex) -> Result<MaskedField> {
        MaskedField::from_sea_values(self.fields[tracer.index()].slot(slot), &self.mask)
    }
}

/// Mean of the entries flagged true, `None` if there are none.
pub(crate) fn masked_mean(values: &[f64], sea: &[bool]) -> Option<f64> {
    let (sum, n) = values
        .iter()
        .zip(sea.iter())
        .filter(|(_, ok)| **ok)
        .fold((0.0, 0usize), |(s, n), (v, _)| (s + v, n + 1));
    if n > 0 { Some(sum / n as f64) } else { None }
}
