//! Error types for model setup and integration.
//!
//! Only configuration problems and forcing exhaustion are errors. Masked
//! velocity samples and concentrations dropping below their floor are
//! handled inside the integrator (fallback substitution and clamping).

use thiserror::Error;

use crate::types::GridShape;

/// Error type for the NPZB model.
#[derive(Debug, Error)]
pub enum NpzbError {
    /// Requested model time needs a forcing sample past the end of the series.
    #[error("Forcing exhausted: t = {time:.1} s is at or beyond the last forcing sample ({forcing_end:.1} s)")]
    ForcingExhausted { time: f64, forcing_end: f64 },

    /// Requested model time precedes the first forcing sample.
    #[error("Model time {time:.1} s is before the first forcing sample at {first:.1} s")]
    BeforeForcingStart { time: f64, first: f64 },

    /// Two grids that must agree have different shapes.
    #[error("Shape mismatch for {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: GridShape,
        found: GridShape,
    },

    /// Array length does not match the grid.
    #[error("Length mismatch for {what}: expected {expected} values, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// State land/sea mask differs from the forcing mask.
    #[error("Land/sea mask of the model state differs from the forcing mask ({differing} cells)")]
    MaskMismatch { differing: usize },

    /// Forcing data violates a structural requirement.
    #[error("Invalid forcing: {0}")]
    InvalidForcing(String),

    /// Configuration value out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// NetCDF library error
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    /// Missing variable in a dataset
    #[error("Missing variable: {0}")]
    MissingVariable(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NpzbError>;
