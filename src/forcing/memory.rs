//! Resident forcing held entirely in memory.

use tracing::debug;

use crate::error::{NpzbError, Result};
use crate::forcing::ForcingProvider;
use crate::mesh::{MaskedField, SeaMask, VELOCITY_SENTINEL};
use crate::types::{ForcingIndex, GridShape};

/// Relative tolerance on the spacing of forcing timestamps.
const UNIFORM_TIME_RTOL: f64 = 1e-6;

/// Validated forcing held in memory for the whole run.
///
/// # Example
///
/// ```
/// use npzb_rs::forcing::{ForcingProvider, InMemoryForcing};
/// use npzb_rs::mesh::SeaMask;
/// use npzb_rs::types::GridShape;
///
/// let mask = SeaMask::closed_basin(GridShape::new(6, 8));
/// // 500 m cells, hourly forcing for one day, steady 0.1 m/s eastward flow
/// let times: Vec<f64> = (0..25).map(|h| h as f64 * 3600.0).collect();
/// let forcing = InMemoryForcing::uniform(mask, 500.0, 500.0, times, 0.1, 0.0).unwrap();
///
/// assert_eq!(forcing.forcing_interval(), 3600.0);
/// assert_eq!(forcing.n_samples(), 25);
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryForcing {
    mask: SeaMask,
    idx: Vec<f64>,
    idy: Vec<f64>,
    lat: Option<Vec<f64>>,
    lon: Option<Vec<f64>>,
    times: Vec<f64>,
    u: Vec<MaskedField>,
    v: Vec<MaskedField>,
}

impl InMemoryForcing {
    /// Create forcing from already-masked velocity samples.
    ///
    /// # Errors
    /// - `LengthMismatch` if a spacing array does not cover the grid
    /// - `ShapeMismatch` if a velocity sample has the wrong shape
    /// - `InvalidForcing` for bad timestamps, spacings or sample counts
    pub fn new(
        mask: SeaMask,
        idx: Vec<f64>,
        idy: Vec<f64>,
        times: Vec<f64>,
        u: Vec<MaskedField>,
        v: Vec<MaskedField>,
    ) -> Result<Self> {
        let shape = mask.shape();
        check_spacing("idx", &idx, &mask)?;
        check_spacing("idy", &idy, &mask)?;
        check_times(&times)?;

        if u.len() != times.len() || v.len() != times.len() {
            return Err(NpzbError::InvalidForcing(format!(
                "{} timestamps but {} u and {} v samples",
                times.len(),
                u.len(),
                v.len()
            )));
        }
        for field in u.iter().chain(v.iter()) {
            if field.shape() != shape {
                return Err(NpzbError::ShapeMismatch {
                    what: "velocity sample",
                    expected: shape,
                    found: field.shape(),
                });
            }
        }

        debug!(
            grid = %shape,
            samples = times.len(),
            interval_s = times[1] - times[0],
            "Loaded in-memory forcing"
        );

        Ok(Self {
            mask,
            idx,
            idy,
            lat: None,
            lon: None,
            times,
            u,
            v,
        })
    }

    /// Create forcing from raw velocity arrays, masking land and sentinel values.
    ///
    /// Each entry of `u_raw`/`v_raw` is one row-major Ny×Nx sample.
    pub fn from_raw_velocity(
        mask: SeaMask,
        idx: Vec<f64>,
        idy: Vec<f64>,
        times: Vec<f64>,
        u_raw: &[Vec<f64>],
        v_raw: &[Vec<f64>],
    ) -> Result<Self> {
        let u = u_raw
            .iter()
            .map(|raw| MaskedField::from_raw(raw, &mask, VELOCITY_SENTINEL))
            .collect::<Result<Vec<_>>>()?;
        let v = v_raw
            .iter()
            .map(|raw| MaskedField::from_raw(raw, &mask, VELOCITY_SENTINEL))
            .collect::<Result<Vec<_>>>()?;
        Self::new(mask, idx, idy, times, u, v)
    }

    /// Uniform grid spacing and a steady, spatially constant current.
    ///
    /// Velocities are masked on land. Mostly useful for tests and idealized runs.
    pub fn uniform(
        mask: SeaMask,
        dx: f64,
        dy: f64,
        times: Vec<f64>,
        u: f64,
        v: f64,
    ) -> Result<Self> {
        let shape = mask.shape();
        let n = shape.n_cells();
        let u_raw = vec![vec![u; n]; times.len()];
        let v_raw = vec![vec![v; n]; times.len()];
        Self::from_raw_velocity(
            mask,
            vec![1.0 / dx; n],
            vec![1.0 / dy; n],
            times,
            &u_raw,
            &v_raw,
        )
    }

    /// Attach cell-centre latitude/longitude.
    pub fn with_coordinates(mut self, lat: Vec<f64>, lon: Vec<f64>) -> Result<Self> {
        let n = self.mask.shape().n_cells();
        for (what, arr) in [("lat", &lat), ("lon", &lon)] {
            if arr.len() != n {
                return Err(NpzbError::LengthMismatch {
                    what,
                    expected: n,
                    found: arr.len(),
                });
            }
        }
        self.lat = Some(lat);
        self.lon = Some(lon);
        Ok(self)
    }

    /// Get summary of data coverage.
    pub fn summary(&self) -> String {
        let valid_u: usize = self.u.iter().map(|f| f.valid_count()).sum();
        let total = self.u.len() * self.mask.sea_count();
        format!(
            "Forcing: {} grid, {} sea cells, {} samples every {:.0} s over [{:.0}, {:.0}] s, {:.1}% valid u",
            self.mask.shape(),
            self.mask.sea_count(),
            self.times.len(),
            self.forcing_interval(),
            self.times[0],
            self.forcing_end(),
            if total > 0 {
                100.0 * valid_u as f64 / total as f64
            } else {
                0.0
            }
        )
    }
}

impl ForcingProvider for InMemoryForcing {
    fn grid_shape(&self) -> GridShape {
        self.mask.shape()
    }

    fn mask(&self) -> &SeaMask {
        &self.mask
    }

    fn inverse_spacing(&self) -> (&[f64], &[f64]) {
        (&self.idx, &self.idy)
    }

    fn forcing_times(&self) -> &[f64] {
        &self.times
    }

    fn velocity_at_index(&self, k: ForcingIndex) -> (&MaskedField, &MaskedField) {
        (&self.u[k], &self.v[k])
    }

    fn coordinates(&self) -> Option<(&[f64], &[f64])> {
        match (&self.lat, &self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

fn check_spacing(what: &'static str, inv: &[f64], mask: &SeaMask) -> Result<()> {
    let n = mask.shape().n_cells();
    if inv.len() != n {
        return Err(NpzbError::LengthMismatch {
            what,
            expected: n,
            found: inv.len(),
        });
    }
    if let Some(cell) = mask.sea_cells().find(|&c| !(inv[c].is_finite() && inv[c] > 0.0)) {
        let (j, i) = mask.shape().row_col(cell);
        return Err(NpzbError::InvalidForcing(format!(
            "{} = {} at sea cell ({}, {}) is not a positive finite inverse spacing",
            what, inv[cell], j, i
        )));
    }
    Ok(())
}

fn check_times(times: &[f64]) -> Result<()> {
    if times.len() < 2 {
        return Err(NpzbError::InvalidForcing(format!(
            "need at least two forcing samples, got {}",
            times.len()
        )));
    }
    let interval = times[1] - times[0];
    if !(interval.is_finite() && interval > 0.0) {
        return Err(NpzbError::InvalidForcing(
            "forcing times must be strictly increasing".to_string(),
        ));
    }
    for (n, pair) in times.windows(2).enumerate() {
        let step = pair[1] - pair[0];
        if step <= 0.0 {
            return Err(NpzbError::InvalidForcing(format!(
                "non-monotonic forcing time at sample {}",
                n + 1
            )));
        }
        if ((step - interval) / interval).abs() > UNIFORM_TIME_RTOL {
            return Err(NpzbError::InvalidForcing(format!(
                "non-uniform forcing interval at sample {}: {} s vs {} s",
                n + 1,
                step,
                interval
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly(n: usize) -> Vec<f64> {
        (0..n).map(|h| h as f64 * 3600.0).collect()
    }

    #[test]
    fn test_uniform_masks_land() {
        let mask = SeaMask::closed_basin(GridShape::new(4, 4));
        let f = InMemoryForcing::uniform(mask, 100.0, 200.0, hourly(3), 0.5, -0.2).unwrap();
        let (u, v) = f.velocity_at_index(ForcingIndex::new(1));
        assert_eq!(u.get(0, 0), None);
        assert_eq!(u.get(1, 1), Some(0.5));
        assert_eq!(v.get(2, 2), Some(-0.2));

        let (idx, idy) = f.inverse_spacing();
        assert_eq!(idx[5], 0.01);
        assert_eq!(idy[5], 0.005);
    }

    #[test]
    fn test_rejects_single_sample() {
        let mask = SeaMask::all_sea(GridShape::new(3, 3));
        let err = InMemoryForcing::uniform(mask, 1.0, 1.0, vec![0.0], 0.0, 0.0).unwrap_err();
        assert!(matches!(err, NpzbError::InvalidForcing(_)));
    }

    #[test]
    fn test_rejects_non_uniform_times() {
        let mask = SeaMask::all_sea(GridShape::new(3, 3));
        let err =
            InMemoryForcing::uniform(mask, 1.0, 1.0, vec![0.0, 10.0, 25.0], 0.0, 0.0).unwrap_err();
        assert!(matches!(err, NpzbError::InvalidForcing(_)));
    }

    #[test]
    fn test_rejects_decreasing_times() {
        let mask = SeaMask::all_sea(GridShape::new(3, 3));
        let err =
            InMemoryForcing::uniform(mask, 1.0, 1.0, vec![10.0, 0.0], 0.0, 0.0).unwrap_err();
        assert!(matches!(err, NpzbError::InvalidForcing(_)));
    }

    #[test]
    fn test_rejects_bad_spacing_on_sea() {
        let shape = GridShape::new(3, 3);
        let mask = SeaMask::all_sea(shape);
        let mut idx = vec![0.01; 9];
        idx[4] = 0.0;
        let u = vec![MaskedField::constant(shape, 0.0); 2];
        let err = InMemoryForcing::new(mask, idx, vec![0.01; 9], hourly(2), u.clone(), u)
            .unwrap_err();
        assert!(matches!(err, NpzbError::InvalidForcing(_)));
    }

    #[test]
    fn test_spacing_ignored_on_land() {
        let shape = GridShape::new(3, 3);
        let mut mask = SeaMask::all_sea(shape);
        mask.set_sea(1, 1, false);
        let mut idx = vec![0.01; 9];
        idx[4] = f64::NAN;
        let u = vec![MaskedField::constant(shape, 0.0); 2];
        assert!(InMemoryForcing::new(mask, idx, vec![0.01; 9], hourly(2), u.clone(), u).is_ok());
    }

    #[test]
    fn test_rejects_sample_count_mismatch() {
        let shape = GridShape::new(3, 3);
        let mask = SeaMask::all_sea(shape);
        let u = vec![MaskedField::constant(shape, 0.0); 3];
        let v = vec![MaskedField::constant(shape, 0.0); 2];
        let err = InMemoryForcing::new(mask, vec![1.0; 9], vec![1.0; 9], hourly(3), u, v)
            .unwrap_err();
        assert!(matches!(err, NpzbError::InvalidForcing(_)));
    }

    #[test]
    fn test_coordinates() {
        let mask = SeaMask::all_sea(GridShape::new(2, 2));
        let f = InMemoryForcing::uniform(mask, 1.0, 1.0, hourly(2), 0.0, 0.0).unwrap();
        assert!(f.coordinates().is_none());
        let f = f
            .with_coordinates(vec![63.0; 4], vec![8.5; 4])
            .unwrap();
        let (lat, lon) = f.coordinates().unwrap();
        assert_eq!(lat[0], 63.0);
        assert_eq!(lon[3], 8.5);
    }
}
