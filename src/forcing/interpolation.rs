//! Linear-in-time interpolation of velocity forcing.

use crate::error::{NpzbError, Result};
use crate::forcing::ForcingProvider;
use crate::mesh::MaskedField;
use crate::types::{ForcingIndex, GridShape};

/// Bracketing sample and blend factor for a model time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterpolationWeights {
    /// Earlier bracketing sample `k`; the later one is `k + 1`
    pub k: ForcingIndex,
    /// Blend factor in [0, 1): result = (1 - frac) * s_k + frac * s_{k+1}
    pub frac: f64,
}

impl InterpolationWeights {
    /// Locate model time `t` within a uniformly spaced series.
    ///
    /// # Errors
    /// - `BeforeForcingStart` if `t` precedes the first sample
    /// - `ForcingExhausted` if sample `k + 1` does not exist
    pub fn locate(times: &[f64], interval: f64, t: f64) -> Result<Self> {
        let first = times[0];
        let fidx = (t - first) / interval;
        if !(fidx >= 0.0) {
            return Err(NpzbError::BeforeForcingStart { time: t, first });
        }
        let k = fidx.floor();
        if k + 1.0 >= times.len() as f64 {
            return Err(NpzbError::ForcingExhausted {
                time: t,
                forcing_end: times[times.len() - 1],
            });
        }
        Ok(Self {
            k: ForcingIndex::new(k as usize),
            frac: fidx - k,
        })
    }
}

/// Produces velocity fields at arbitrary model times.
///
/// Owns the output buffers so that interpolation does not allocate per step.
///
/// # Example
///
/// ```
/// use npzb_rs::forcing::{InMemoryForcing, VelocityInterpolator};
/// use npzb_rs::mesh::SeaMask;
/// use npzb_rs::types::GridShape;
///
/// let mask = SeaMask::all_sea(GridShape::new(3, 3));
/// let forcing = InMemoryForcing::uniform(mask, 1.0, 1.0, vec![0.0, 60.0, 120.0], 0.2, 0.0).unwrap();
///
/// let mut interp = VelocityInterpolator::new(GridShape::new(3, 3));
/// let w = interp.interpolate(&forcing, 90.0).unwrap();
/// assert_eq!(w.k.get(), 1);
/// assert_eq!(w.frac, 0.5);
/// assert_eq!(interp.u().get(1, 1), Some(0.2));
///
/// // The last sample cannot be bracketed
/// assert!(interp.interpolate(&forcing, 120.0).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct VelocityInterpolator {
    u: MaskedField,
    v: MaskedField,
}

impl VelocityInterpolator {
    /// Create an interpolator for a grid.
    pub fn new(shape: GridShape) -> Self {
        Self {
            u: MaskedField::missing(shape),
            v: MaskedField::missing(shape),
        }
    }

    /// Interpolate u and v to model time `t` (seconds).
    ///
    /// A cell is valid only if it is valid in both bracketing samples, except
    /// when `frac == 0`, where it takes sample `k` and its validity exactly.
    pub fn interpolate<F: ForcingProvider + ?Sized>(
        &mut self,
        forcing: &F,
        t: f64,
    ) -> Result<InterpolationWeights> {
        let weights =
            InterpolationWeights::locate(forcing.forcing_times(), forcing.forcing_interval(), t)?;
        let (u0, v0) = forcing.velocity_at_index(weights.k);
        let (u1, v1) = forcing.velocity_at_index(weights.k.next());
        self.u.assign_lerp(u0, u1, weights.frac);
        self.v.assign_lerp(v0, v1, weights.frac);
        Ok(weights)
    }

    /// Interpolated eastward velocity.
    #[inline]
    pub fn u(&self) -> &MaskedField {
        &self.u
    }

    /// Interpolated northward velocity.
    #[inline]
    pub fn v(&self) -> &MaskedField {
        &self.v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forcing::InMemoryForcing;
    use crate::mesh::SeaMask;

    fn two_sample_forcing() -> InMemoryForcing {
        let shape = GridShape::new(3, 3);
        let mask = SeaMask::all_sea(shape);
        let mut u1 = vec![3.0; 9];
        u1[0] = 2.0e4; // sentinel
        InMemoryForcing::from_raw_velocity(
            mask,
            vec![1.0; 9],
            vec![1.0; 9],
            vec![0.0, 100.0, 200.0],
            &[vec![1.0; 9], u1, vec![5.0; 9]],
            &[vec![-1.0; 9], vec![1.0; 9], vec![0.0; 9]],
        )
        .unwrap()
    }

    #[test]
    fn test_exact_at_sample_time() {
        let forcing = two_sample_forcing();
        let mut interp = VelocityInterpolator::new(GridShape::new(3, 3));
        let w = interp.interpolate(&forcing, 100.0).unwrap();
        assert_eq!(w.k, ForcingIndex::new(1));
        assert_eq!(w.frac, 0.0);
        assert_eq!(interp.u().get(1, 1), Some(3.0));
        // Missing in the sample stays missing, even though sample k+1 is valid
        assert_eq!(interp.u().get(0, 0), None);
    }

    #[test]
    fn test_midpoint_is_mean() {
        let forcing = two_sample_forcing();
        let mut interp = VelocityInterpolator::new(GridShape::new(3, 3));
        interp.interpolate(&forcing, 50.0).unwrap();
        assert_eq!(interp.u().get(2, 2), Some(2.0));
        assert_eq!(interp.v().get(2, 2), Some(0.0));
        // Sentinel in sample 1 masks the blend
        assert_eq!(interp.u().get(0, 0), None);
    }

    #[test]
    fn test_quarter_weight() {
        let forcing = two_sample_forcing();
        let mut interp = VelocityInterpolator::new(GridShape::new(3, 3));
        let w = interp.interpolate(&forcing, 125.0).unwrap();
        assert_eq!(w.frac, 0.25);
        assert_eq!(interp.u().get(1, 2), Some(0.75 * 3.0 + 0.25 * 5.0));
    }

    #[test]
    fn test_exhausted_at_last_sample() {
        let forcing = two_sample_forcing();
        let mut interp = VelocityInterpolator::new(GridShape::new(3, 3));
        let err = interp.interpolate(&forcing, 200.0).unwrap_err();
        assert!(matches!(err, NpzbError::ForcingExhausted { .. }));
        assert!(interp.interpolate(&forcing, 199.0).is_ok());
    }

    #[test]
    fn test_exhausted_far_past_end() {
        let forcing = two_sample_forcing();
        let mut interp = VelocityInterpolator::new(GridShape::new(3, 3));
        for t in [1.0e30, f64::MAX, f64::INFINITY] {
            let err = interp.interpolate(&forcing, t).unwrap_err();
            assert!(matches!(err, NpzbError::ForcingExhausted { .. }));
        }
    }

    #[test]
    fn test_before_start() {
        let forcing = two_sample_forcing();
        let mut interp = VelocityInterpolator::new(GridShape::new(3, 3));
        let err = interp.interpolate(&forcing, -1.0).unwrap_err();
        assert!(matches!(err, NpzbError::BeforeForcingStart { .. }));
    }
}
