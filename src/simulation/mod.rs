//! Run driver.
//!
//! Ties together the integrator, output sampling, diagnostics and
//! progress reporting.
//!
//! # Example
//! ```ignore
//! let integrator = LeapfrogIntegrator::from_config(&forcing, config)?;
//! let result = Simulation::new(integrator)
//!     .with_output_interval(86_400.0)
//!     .run_with_callback(|snap| println!("day {:.0}", snap.time / 86_400.0))?;
//! ```

mod archive;
mod runner;

pub use archive::{OutputArchive, Snapshot};
pub use runner::{Simulation, SimulationConfig, SimulationResult, StopReason};
