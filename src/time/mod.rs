//! Time integration.
//!
//! - [`LeapfrogIntegrator`]: three-level leapfrog stepper for the NPZB system
//! - [`mode_filter`]: periodic averaging against the leapfrog computational mode
//! - [`IntegratorInfo`]: scheme metadata for logging and diagnostics

mod filter;
mod integrator;
mod leapfrog;

pub use filter::mode_filter;
pub use integrator::IntegratorInfo;
pub use leapfrog::{LeapfrogIntegrator, StepResult};
