//! Grid state, right-hand side and diagnostics of the NPZB model.
//!
//! # Submodules
//!
//! - [`state`]: Masked N, P, Z, B fields with three time levels
//! - [`rhs`]: Finite-difference transport and reaction update
//! - [`diagnostics`]: Inventories, stability checks and progress reporting

pub mod diagnostics;
pub mod rhs;
pub mod state;

pub use diagnostics::{
    DiagnosticsTracker, FieldBounds, NPZBDiagnostics, ProgressReporter, format_duration,
};
pub use state::{GradientSpec, LevelsMut, NPZBState, ScalarField, TimeLevels, Tracer};
