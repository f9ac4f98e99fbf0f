//! File I/O for forcing and model output.
//!
//! - **NetCDF forcing**: [`ForcingDatasetReader`] loads gridded currents,
//!   spacing and the land/sea mask into an [`InMemoryForcing`](crate::forcing::InMemoryForcing)
//! - **NetCDF output**: [`SnapshotWriter`] writes archived N/P/Z/B samples as
//!   CF-1.8 with `_FillValue` on land
//!
//! Both require the `netcdf` feature. Configuration files are JSON and are
//! handled by [`ModelConfig`](crate::config::ModelConfig).

#[cfg(feature = "netcdf")]
mod netcdf_io;

#[cfg(feature = "netcdf")]
pub use netcdf_io::{
    ForcingDatasetReader, SnapshotWriter, SnapshotWriterConfig, write_archive_for,
};
