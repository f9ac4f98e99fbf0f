//! Right-hand side evaluation.
//!
//! - [`compute_reactions`]: vertical velocity and reaction tendencies
//! - [`leapfrog_update`]: transport plus reaction update of one field

mod npzb_2d;

pub use npzb_2d::{
    FallbackMeans, FieldUpdate, StencilGrid, compute_reactions, leapfrog_update,
};

#[cfg(feature = "parallel")]
pub use npzb_2d::leapfrog_update_parallel;
