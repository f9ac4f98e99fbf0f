//! Finite-difference right-hand side of the NPZB leapfrog step.
//!
//! For N, P and Z:
//!
//! ```text
//! next = prev + 2Δt·(−u·∂f/∂x − v·∂f/∂y + At·∇²f + R_f)
//! ```
//!
//! with centred advection evaluated at the current level and diffusion at
//! the previous level (the leapfrog/DuFort lag that keeps diffusion stable).
//! B has no transport: `next = prev + 2Δt·R_B`.
//!
//! Only interior sea cells are updated; the outer ring of the grid keeps
//! whatever its slot holds. Any land neighbour or missing velocity is
//! replaced by the domain mean for this step.

use crate::mesh::MaskedField;
use crate::solver::state::masked_mean;
use crate::solver::{NPZBState, Tracer};
use crate::source::{ReactionContext, ReactionSource, Tendencies, vertical_velocity};
use crate::types::{GridShape, SlotIndex};

/// Substitute values for masked reads during one step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FallbackMeans {
    pub n: f64,
    pub p: f64,
    pub z: f64,
    pub b: f64,
    pub u: f64,
    pub v: f64,
}

impl FallbackMeans {
    /// Means of the valid cells of each field; 0 when a field has none.
    pub fn compute(state: &NPZBState, slot: SlotIndex, u: &MaskedField, v: &MaskedField) -> Self {
        let sea = state.mask().flags();
        let mean = |tracer: Tracer| {
            masked_mean(state.field(tracer).slot(slot), sea).unwrap_or(0.0)
        };
        Self {
            n: mean(Tracer::N),
            p: mean(Tracer::P),
            z: mean(Tracer::Z),
            b: mean(Tracer::B),
            u: u.mean_valid().unwrap_or(0.0),
            v: v.mean_valid().unwrap_or(0.0),
        }
    }

    /// Fallback for one variable.
    #[inline]
    pub fn of(&self, tracer: Tracer) -> f64 {
        match tracer {
            Tracer::N => self.n,
            Tracer::P => self.p,
            Tracer::Z => self.z,
            Tracer::B => self.b,
        }
    }
}

/// Grid geometry shared by every stencil.
#[derive(Clone, Copy, Debug)]
pub struct StencilGrid<'a> {
    pub shape: GridShape,
    /// Sea flags, row-major
    pub sea: &'a [bool],
    /// Inverse x spacing (1/m)
    pub idx: &'a [f64],
    /// Inverse y spacing (1/m)
    pub idy: &'a [f64],
}

impl StencilGrid<'_> {
    /// Whether (j, i) is a sea cell away from the outer ring.
    #[inline]
    pub fn is_interior_sea(&self, j: usize, i: usize) -> bool {
        !self.shape.is_boundary(j, i) && self.sea[j * self.shape.nx() + i]
    }
}

/// Evaluate w and the reaction tendencies over interior sea cells.
///
/// Other cells get `w = 0` and zero tendencies. With `vertical_coupling`
/// off, w is zero everywhere.
#[allow(clippy::too_many_arguments)]
pub fn compute_reactions(
    state: &NPZBState,
    slot: SlotIndex,
    u: &MaskedField,
    v: &MaskedField,
    grid: &StencilGrid<'_>,
    means: &FallbackMeans,
    source: &dyn ReactionSource,
    vertical_coupling: bool,
    w: &mut [f64],
    out: &mut [Tendencies],
) {
    let nx = grid.shape.nx();
    let [n, p, z, b] = Tracer::ALL.map(|t| state.field(t).slot(slot));

    w.fill(0.0);
    out.fill(Tendencies::zero());

    for j in 1..grid.shape.ny().saturating_sub(1) {
        for i in 1..nx - 1 {
            if !grid.is_interior_sea(j, i) {
                continue;
            }
            let k = j * nx + i;
            if vertical_coupling {
                w[k] = vertical_velocity(
                    grid.idx[k],
                    grid.idy[k],
                    u.value_or(j, i + 1, means.u),
                    u.value_or(j, i - 1, means.u),
                    v.value_or(j + 1, i, means.v),
                    v.value_or(j - 1, i, means.v),
                );
            }
            let ctx = ReactionContext::new(n[k], p[k], z[k], b[k], w[k]);
            out[k] = source.evaluate(&ctx);
        }
    }
}

/// Inputs for the leapfrog update of one field.
pub struct FieldUpdate<'a> {
    pub tracer: Tracer,
    pub grid: StencilGrid<'a>,
    /// Level n − 1
    pub prev: &'a [f64],
    /// Level n
    pub cur: &'a [f64],
    pub u: &'a MaskedField,
    pub v: &'a MaskedField,
    pub reactions: &'a [Tendencies],
    pub means: FallbackMeans,
    /// Horizontal diffusivity At (m²/s)
    pub diffusivity: f64,
    /// Leapfrog step 2Δt (s)
    pub two_dt: f64,
}

impl FieldUpdate<'_> {
    #[inline]
    fn read(&self, values: &[f64], k: usize, fallback: f64) -> f64 {
        if self.grid.sea[k] { values[k] } else { fallback }
    }

    /// Update the interior cells of row `j`; `row` is that row of the next slot.
    pub fn update_row(&self, j: usize, row: &mut [f64]) {
        let shape = self.grid.shape;
        let nx = shape.nx();
        if j == 0 || j + 1 >= shape.ny() {
            return;
        }
        let fallback = self.means.of(self.tracer);
        let transported = self.tracer != Tracer::B;

        for i in 1..nx - 1 {
            if !self.grid.is_interior_sea(j, i) {
                continue;
            }
            let k = j * nx + i;
            let reaction = self.reactions[k].of(self.tracer);

            let transport = if transported {
                let (e, w, n, s) = (k + 1, k - 1, k + nx, k - nx);
                let idx = self.grid.idx[k];
                let idy = self.grid.idy[k];
                let u = self.u.value_or(j, i, self.means.u);
                let v = self.v.value_or(j, i, self.means.v);

                let adv_x = 0.5 * idx * u * (self.read(self.cur, e, fallback) - self.read(self.cur, w, fallback));
                let adv_y = 0.5 * idy * v * (self.read(self.cur, n, fallback) - self.read(self.cur, s, fallback));

                let centre = self.prev[k];
                let diff_x = idx * idx
                    * (self.read(self.prev, e, fallback) - 2.0 * centre + self.read(self.prev, w, fallback));
                let diff_y = idy * idy
                    * (self.read(self.prev, n, fallback) - 2.0 * centre + self.read(self.prev, s, fallback));

                -adv_x - adv_y + self.diffusivity * (diff_x + diff_y)
            } else {
                0.0
            };

            row[i] = self.prev[k] + self.two_dt * (transport + reaction);
        }
    }
}

/// Leapfrog update of one field into `next`.
pub fn leapfrog_update(update: &FieldUpdate<'_>, next: &mut [f64]) {
    let nx = update.grid.shape.nx();
    next.chunks_mut(nx)
        .enumerate()
        .for_each(|(j, row)| update.update_row(j, row));
}

/// Leapfrog update of one field into `next`, rows processed in parallel.
///
/// Rows are independent, so results match [`leapfrog_update`] exactly.
#[cfg(feature = "parallel")]
pub fn leapfrog_update_parallel(update: &FieldUpdate<'_>, next: &mut [f64]) {
    use rayon::prelude::*;

    let nx = update.grid.shape.nx();
    next.par_chunks_mut(nx)
        .enumerate()
        .for_each(|(j, row)| update.update_row(j, row));
}
