//! Vertical exchange between the water column and the benthos.
//!
//! There is no vertical resolution. A vertical velocity is diagnosed from
//! the horizontal divergence of the current and used to exchange nutrient
//! with the benthic pool in proportion to their difference.

use super::traits::{ReactionContext, ReactionSource, Tendencies};

/// Divisor applied to the horizontal divergence when diagnosing w.
pub const VERTICAL_DAMPING: f64 = 10.0;

/// Vertical velocity from centred differences of u and v.
///
/// `w = (idx·(u_e − u_w) + idy·(v_n − v_s)) / 10`
#[inline]
pub fn vertical_velocity(idx: f64, idy: f64, u_e: f64, u_w: f64, v_n: f64, v_s: f64) -> f64 {
    (idx * (u_e - u_w) + idy * (v_n - v_s)) / VERTICAL_DAMPING
}

/// Exchange flux `w·(N − B)`, leaving N and entering B.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VerticalExchange;

impl ReactionSource for VerticalExchange {
    #[inline]
    fn evaluate(&self, ctx: &ReactionContext) -> Tendencies {
        let flux = ctx.w * (ctx.n - ctx.b);
        Tendencies {
            n: -flux,
            b: flux,
            ..Tendencies::zero()
        }
    }

    fn name(&self) -> &'static str {
        "vertical_exchange"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_divergence_no_w() {
        assert_eq!(vertical_velocity(0.01, 0.01, 0.3, 0.3, -0.1, -0.1), 0.0);
    }

    #[test]
    fn test_divergence_scaled() {
        // idx·Δu = 0.5, idy·Δv = 0.5
        let w = vertical_velocity(0.5, 0.25, 1.0, 0.0, 2.0, 0.0);
        assert_eq!(w, 0.1);
    }

    #[test]
    fn test_exchange_conserves() {
        let t = VerticalExchange.evaluate(&ReactionContext::new(2.0, 0.0, 0.0, 0.5, 0.2));
        assert_eq!(t.n, -0.2 * 1.5);
        assert_eq!(t.b, 0.2 * 1.5);
        assert_eq!(t.total(), 0.0);
    }
}
