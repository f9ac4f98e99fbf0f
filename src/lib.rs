//! # npzb-rs
//!
//! A depth-averaged NPZB (nutrient, phytoplankton, zooplankton, benthos)
//! ecosystem model for fjords and coastal basins on a regular 2D grid.
//!
//! Pelagic N, P and Z are advected by prescribed ocean currents, diffused
//! horizontally and exchanged through a biological reaction network. B is a
//! non-transported benthic pool fed by sinking detritus and returned by an
//! upwelling-driven vertical exchange.
//!
//! The crate provides:
//! - Grid types and land/sea masking ([`types`], [`mesh`])
//! - In-memory velocity forcing with linear time interpolation ([`forcing`])
//! - Model state on three rotating leapfrog levels ([`solver::state`])
//! - Advection/diffusion stencils and reaction terms ([`solver::rhs`], [`source`])
//! - The leapfrog integrator with a Robert–Asselin filter ([`time`])
//! - A driver that samples output on a fixed interval ([`simulation`])
//! - NetCDF input and output behind the `netcdf` feature ([`io`])
//!
//! # Example
//!
//! ```
//! use npzb_rs::{InMemoryForcing, LeapfrogIntegrator, ModelConfig, Simulation, Tracer};
//! use npzb_rs::mesh::SeaMask;
//! use npzb_rs::types::GridShape;
//!
//! let mask = SeaMask::closed_basin(GridShape::new(10, 20));
//! let times: Vec<f64> = (0..=12).map(|h| h as f64 * 3600.0).collect();
//! let forcing = InMemoryForcing::uniform(mask, 250.0, 250.0, times, 0.05, 0.0).unwrap();
//!
//! let integrator = LeapfrogIntegrator::from_config(&forcing, ModelConfig::default()).unwrap();
//! let result = Simulation::new(integrator)
//!     .with_output_interval(6.0 * 3600.0)
//!     .quiet()
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(result.archive.len(), 3);
//! let n_final = result.archive.last().unwrap().field(Tracer::N);
//! assert!(n_final.get(5, 5).unwrap() > 0.0);
//! ```

pub mod config;
pub mod error;
pub mod forcing;
pub mod io;
pub mod mesh;
pub mod simulation;
pub mod solver;
pub mod source;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use config::{BiologyConfig, FloorValues, InitialConditions, LevelPair, ModelConfig};
pub use error::{NpzbError, Result};
pub use forcing::{ForcingProvider, InMemoryForcing, VelocityInterpolator};
pub use mesh::{MaskedField, SeaMask};
pub use simulation::{
    OutputArchive, Simulation, SimulationConfig, SimulationResult, Snapshot, StopReason,
};
pub use solver::{
    DiagnosticsTracker, GradientSpec, NPZBDiagnostics, NPZBState, ProgressReporter, TimeLevels,
    Tracer,
};
pub use source::{
    BiologyRates, CombinedReaction, NPZBiology, ReactionContext, ReactionSource, Tendencies,
    VerticalExchange,
};
pub use time::{IntegratorInfo, LeapfrogIntegrator, StepResult};
pub use types::{CellIndex, CellRegion, ForcingIndex, GridShape, SlotIndex};

#[cfg(feature = "netcdf")]
pub use io::{ForcingDatasetReader, SnapshotWriter, SnapshotWriterConfig};
