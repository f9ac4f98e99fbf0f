//! Ocean-current forcing for the ecosystem model.
//!
//! The integrator consumes forcing through the [`ForcingProvider`] trait:
//! grid geometry, the land/sea mask, inverse grid spacings and a uniformly
//! sampled series of eastward (u) and northward (v) velocity fields. All
//! forcing is held in memory for the duration of a run.
//!
//! - [`InMemoryForcing`]: validated, resident forcing (built directly or by
//!   the NetCDF reader in [`crate::io`])
//! - [`VelocityInterpolator`]: linear-in-time interpolation between samples

mod interpolation;
mod memory;

pub use interpolation::{InterpolationWeights, VelocityInterpolator};
pub use memory::InMemoryForcing;

use crate::mesh::{MaskedField, SeaMask};
use crate::types::{ForcingIndex, GridShape};

/// Read-only source of grid geometry and velocity forcing.
///
/// Implementations must guarantee:
/// - `forcing_times()` is strictly increasing with a uniform interval (seconds)
/// - every array has `grid_shape().n_cells()` entries, row-major
/// - `velocity_at_index(k)` is defined for `k < forcing_times().len()`
pub trait ForcingProvider {
    /// Grid dimensions (Ny, Nx).
    fn grid_shape(&self) -> GridShape;

    /// Land/sea mask (true = sea).
    fn mask(&self) -> &SeaMask;

    /// Inverse grid spacings `(idx, idy)` in 1/m.
    fn inverse_spacing(&self) -> (&[f64], &[f64]);

    /// Forcing timestamps in seconds.
    fn forcing_times(&self) -> &[f64];

    /// Raw velocity samples `(u_k, v_k)`, possibly with missing entries.
    fn velocity_at_index(&self, k: ForcingIndex) -> (&MaskedField, &MaskedField);

    /// Latitude/longitude of cell centres, if known.
    fn coordinates(&self) -> Option<(&[f64], &[f64])> {
        None
    }

    /// Sample interval of the forcing series (seconds).
    fn forcing_interval(&self) -> f64 {
        let t = self.forcing_times();
        t[1] - t[0]
    }

    /// Number of forcing samples.
    fn n_samples(&self) -> usize {
        self.forcing_times().len()
    }

    /// Timestamp of the last sample. Interpolation needs `t < forcing_end()`.
    fn forcing_end(&self) -> f64 {
        let t = self.forcing_times();
        t[t.len() - 1]
    }
}
