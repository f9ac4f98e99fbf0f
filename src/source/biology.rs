//! NPZB biological reaction terms.
//!
//! Fluxes between the pools (all per second):
//!
//! ```text
//! uptake        = Vm · P · N / (ks + N)                 N → P
//! p_mortality   = m · P                                 P → N
//! grazing       = ivlev · P · Rm · (1 − e^(−ivlev·P)) · Z   P → Z (fraction gamma → N)
//! z_mortality   = g · Z                                 Z → N
//! benthic_input = alpha · P                             P → B
//! ```
//!
//! Every flux leaves one pool and enters another, so the tendencies sum
//! to zero.

use super::traits::{ReactionContext, ReactionSource, Tendencies};

/// Biological rates in per-second units.
///
/// Built from [`crate::config::BiologyConfig::to_rates`], which converts
/// from the per-day literature values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiologyRates {
    /// Maximum uptake rate (1/s)
    pub vm: f64,
    /// Half-saturation constant
    pub ks: f64,
    /// Phytoplankton mortality (1/s)
    pub m: f64,
    /// Benthic export (1/s)
    pub alpha: f64,
    /// Fraction of grazing returned to nutrients
    pub gamma: f64,
    /// Maximum grazing rate (1/s)
    pub rm: f64,
    /// Ivlev constant
    pub ivlev: f64,
    /// Zooplankton mortality (1/s)
    pub g: f64,
}

impl BiologyRates {
    /// All fluxes switched off.
    pub fn zero() -> Self {
        Self {
            vm: 0.0,
            ks: 1.0,
            m: 0.0,
            alpha: 0.0,
            gamma: 0.0,
            rm: 0.0,
            ivlev: 0.0,
            g: 0.0,
        }
    }
}

/// Michaelis–Menten nutrient uptake `Vm·P·N/(ks+N)`.
#[inline]
pub fn michaelis_menten_uptake(vm: f64, ks: f64, n: f64, p: f64) -> f64 {
    vm * p * n / (ks + n)
}

/// Ivlev grazing `ivlev·P·Rm·(1 − exp(−ivlev·P))·Z`.
#[inline]
pub fn ivlev_grazing(ivlev: f64, rm: f64, p: f64, z: f64) -> f64 {
    ivlev * p * rm * (1.0 - (-ivlev * p).exp()) * z
}

/// The five biological fluxes at one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReactionTerms {
    pub uptake: f64,
    pub p_mortality: f64,
    pub grazing: f64,
    pub z_mortality: f64,
    pub benthic_input: f64,
}

impl ReactionTerms {
    /// Evaluate the fluxes from local N, P, Z.
    #[inline]
    pub fn compute(rates: &BiologyRates, n: f64, p: f64, z: f64) -> Self {
        Self {
            uptake: michaelis_menten_uptake(rates.vm, rates.ks, n, p),
            p_mortality: rates.m * p,
            grazing: ivlev_grazing(rates.ivlev, rates.rm, p, z),
            z_mortality: rates.g * z,
            benthic_input: rates.alpha * p,
        }
    }

    /// Tendencies of N, P, Z, B implied by the fluxes.
    #[inline]
    pub fn tendencies(&self, gamma: f64) -> Tendencies {
        Tendencies {
            n: -self.uptake + self.p_mortality + self.z_mortality + gamma * self.grazing,
            p: self.uptake - self.p_mortality - self.grazing - self.benthic_input,
            z: (1.0 - gamma) * self.grazing - self.z_mortality,
            b: self.benthic_input,
        }
    }
}

/// Biological source term.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NPZBiology {
    rates: BiologyRates,
}

impl NPZBiology {
    /// Create the source from per-second rates.
    pub fn new(rates: BiologyRates) -> Self {
        Self { rates }
    }

    /// Rates in use.
    pub fn rates(&self) -> &BiologyRates {
        &self.rates
    }
}

impl ReactionSource for NPZBiology {
    #[inline]
    fn evaluate(&self, ctx: &ReactionContext) -> Tendencies {
        ReactionTerms::compute(&self.rates, ctx.n, ctx.p, ctx.z).tendencies(self.rates.gamma)
    }

    fn name(&self) -> &'static str {
        "npz_biology"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BiologyConfig;
    use approx::assert_relative_eq;

    #[test]
    fn test_ivlev_reference_value() {
        let grazing = ivlev_grazing(1.0, 1.5, 1.0, 1.0);
        assert_relative_eq!(grazing, 0.9482, epsilon = 1e-4);
    }

    #[test]
    fn test_uptake_saturates() {
        assert_eq!(michaelis_menten_uptake(2.0, 1.0, 1.0, 1.0), 1.0);
        assert!(michaelis_menten_uptake(2.0, 1.0, 1e6, 1.0) < 2.0);
        assert_eq!(michaelis_menten_uptake(2.0, 1.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_tendencies_conserve_mass() {
        let rates = BiologyConfig::default().to_rates();
        for &(n, p, z) in &[(1.0, 0.5, 0.2), (5.0, 1e-5, 3.0), (1e-5, 2.0, 1e-5)] {
            let t = ReactionTerms::compute(&rates, n, p, z).tendencies(rates.gamma);
            let scale = t.n.abs() + t.p.abs() + t.z.abs() + t.b.abs();
            assert!(t.total().abs() <= 1e-14 * scale.max(1e-30));
        }
    }

    #[test]
    fn test_benthic_export_moves_p_to_b() {
        let mut rates = BiologyRates::zero();
        rates.alpha = 0.1;
        let t = NPZBiology::new(rates).evaluate(&ReactionContext::new(1.0, 2.0, 1.0, 0.0, 0.0));
        assert_relative_eq!(t.p, -0.2);
        assert_relative_eq!(t.b, 0.2);
        assert_eq!(t.n, 0.0);
        assert_eq!(t.z, 0.0);
    }

    #[test]
    fn test_zero_rates_give_zero_tendencies() {
        let t = NPZBiology::new(BiologyRates::zero())
            .evaluate(&ReactionContext::new(3.0, 2.0, 1.0, 0.5, 0.0));
        assert_eq!(t, Tendencies::zero());
    }
}
