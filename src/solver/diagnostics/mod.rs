//! Runtime diagnostics and progress tracking.
//!
//! - [`NPZBDiagnostics`]: Inventories and bounds of one model level
//! - [`DiagnosticsTracker`]: Drift and stability over a run
//! - [`ProgressReporter`]: Progress logging

mod diagnostics;

pub use diagnostics::{
    DiagnosticsTracker, FieldBounds, NPZBDiagnostics, ProgressReporter, format_duration,
};
