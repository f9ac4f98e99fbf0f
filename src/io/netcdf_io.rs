//! NetCDF forcing input and snapshot output.
//!
//! # Forcing datasets
//!
//! A forcing file holds one regular Ny×Nx grid:
//!
//! | variable   | dims             | notes                                  |
//! |------------|------------------|----------------------------------------|
//! | `time`     | (time)           | days; converted to seconds on load     |
//! | `lat`,`lon`| (y, x) or (y)/(x)| cell centres, optional                 |
//! | `mask`     | (y, x)           | 0 = land, 1 = sea                      |
//! | `dx`,`dy`  | (y, x)           | grid spacing in m; inverted on load    |
//! | `u`,`v`    | (time, y, x)     | m/s; fill and sentinel values masked   |
//!
//! Packed velocities (`scale_factor`/`add_offset`) are unpacked on load.
//!
//! # Output
//!
//! [`SnapshotWriter`] writes an [`OutputArchive`] as a CF-1.8 file with one
//! `(time, y, x)` variable per tracer. Land cells hold `_FillValue`.
//!
//! # Example
//!
//! ```rust,ignore
//! use npzb_rs::io::{ForcingDatasetReader, SnapshotWriter, SnapshotWriterConfig};
//!
//! let forcing = ForcingDatasetReader::from_file("fjord_currents.nc")?;
//! let result = Simulation::new(LeapfrogIntegrator::from_config(&forcing, model_config)?).run()?;
//!
//! let out = SnapshotWriterConfig::new("npzb_out.nc").with_title("Fjord NPZB run");
//! SnapshotWriter::write_archive(out, forcing.mask(), forcing.coordinates(), &result.archive)?;
//! ```

use std::path::Path;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::SECONDS_PER_DAY;
use crate::error::{NpzbError, Result};
use crate::forcing::{ForcingProvider, InMemoryForcing};
use crate::mesh::{FILL_VALUE_F64, SeaMask};
use crate::simulation::{OutputArchive, Snapshot};
use crate::solver::Tracer;
use crate::types::GridShape;

// ============================================================================
// Forcing reader
// ============================================================================

/// Reader for gridded current forcing.
pub struct ForcingDatasetReader {
    file: netcdf::File,
    shape: GridShape,
}

impl ForcingDatasetReader {
    /// Open a dataset and determine its grid from the `mask` variable.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = netcdf::open(path)?;
        let shape = {
            let mask = file
                .variable("mask")
                .ok_or_else(|| NpzbError::MissingVariable("mask".to_string()))?;
            let dims = mask.dimensions();
            if dims.len() != 2 {
                return Err(NpzbError::InvalidForcing(format!(
                    "mask must be 2D (y, x), found {} dimensions",
                    dims.len()
                )));
            }
            GridShape::new(dims[0].len(), dims[1].len())
        };
        debug!(path = %path.display(), grid = %shape, "Opened forcing dataset");
        Ok(Self { file, shape })
    }

    /// Load a whole dataset into memory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<InMemoryForcing> {
        Self::open(path)?.read()
    }

    /// Grid dimensions of the dataset.
    pub fn grid_shape(&self) -> GridShape {
        self.shape
    }

    /// Read and validate everything the integrator needs.
    pub fn read(&self) -> Result<InMemoryForcing> {
        let mask = self.read_mask()?;
        let times = self.read_times()?;
        let idx = self.read_inverse_spacing("dx")?;
        let idy = self.read_inverse_spacing("dy")?;
        let u = self.read_velocity("u", times.len())?;
        let v = self.read_velocity("v", times.len())?;

        let forcing = InMemoryForcing::from_raw_velocity(mask, idx, idy, times, &u, &v)?;
        let forcing = match self.read_coordinates()? {
            Some((lat, lon)) => forcing.with_coordinates(lat, lon)?,
            None => forcing,
        };
        info!("{}", forcing.summary());
        Ok(forcing)
    }

    /// Land/sea mask (non-zero = sea).
    pub fn read_mask(&self) -> Result<SeaMask> {
        let values = self.read_grid_variable("mask")?;
        SeaMask::from_values(self.shape, &values)
    }

    /// Forcing timestamps in seconds.
    pub fn read_times(&self) -> Result<Vec<f64>> {
        let var = self.variable("time")?;
        let days: Vec<f64> = var.get_values(..)?;
        Ok(days.into_iter().map(|d| d * SECONDS_PER_DAY).collect())
    }

    /// Reciprocal of a spacing variable. Land and non-positive entries become NaN.
    fn read_inverse_spacing(&self, name: &str) -> Result<Vec<f64>> {
        let spacing = self.read_grid_variable(name)?;
        Ok(spacing
            .into_iter()
            .map(|d| if d.is_finite() && d > 0.0 { 1.0 / d } else { f64::NAN })
            .collect())
    }

    /// Cell-centre coordinates, expanding 1D axes to the full grid.
    fn read_coordinates(&self) -> Result<Option<(Vec<f64>, Vec<f64>)>> {
        let (Some(lat_var), Some(lon_var)) = (self.file.variable("lat"), self.file.variable("lon"))
        else {
            return Ok(None);
        };
        let (ny, nx) = self.shape.as_tuple();
        let lat: Vec<f64> = lat_var.get_values(..)?;
        let lon: Vec<f64> = lon_var.get_values(..)?;

        if lat_var.dimensions().len() == 2 {
            return Ok(Some((lat, lon)));
        }
        if lat.len() != ny || lon.len() != nx {
            return Err(NpzbError::InvalidForcing(format!(
                "1D coordinates have {} lat and {} lon values for a {} grid",
                lat.len(),
                lon.len(),
                self.shape
            )));
        }
        let mut lat2 = Vec::with_capacity(ny * nx);
        let mut lon2 = Vec::with_capacity(ny * nx);
        for &la in &lat {
            lat2.extend(std::iter::repeat_n(la, nx));
            lon2.extend_from_slice(&lon);
        }
        Ok(Some((lat2, lon2)))
    }

    /// Velocity samples as row-major per-time slices, unpacked but not yet masked.
    fn read_velocity(&self, name: &str, n_time: usize) -> Result<Vec<Vec<f64>>> {
        let var = self.variable(name)?;
        let dims = var.dimensions();
        let (ny, nx) = self.shape.as_tuple();
        if dims.len() != 3 || dims[1].len() != ny || dims[2].len() != nx || dims[0].len() != n_time
        {
            return Err(NpzbError::InvalidForcing(format!(
                "{} must have dims (time={}, y={}, x={}), found {:?}",
                name,
                n_time,
                ny,
                nx,
                dims.iter().map(|d| d.len()).collect::<Vec<_>>()
            )));
        }

        let scale = get_attr_f64(&var, "scale_factor").unwrap_or(1.0);
        let offset = get_attr_f64(&var, "add_offset").unwrap_or(0.0);
        let fill = get_attr_f64(&var, "_FillValue");

        let flat: Vec<f64> = var.get_values(..)?;
        let unpacked = flat
            .into_iter()
            .map(|v| {
                if fill.is_some_and(|f| v == f) {
                    f64::NAN
                } else {
                    v * scale + offset
                }
            })
            .collect::<Vec<_>>();

        Ok(unpacked
            .chunks_exact(self.shape.n_cells())
            .map(<[f64]>::to_vec)
            .collect())
    }

    /// A 2D (y, x) variable as a flat row-major array.
    fn read_grid_variable(&self, name: &str) -> Result<Vec<f64>> {
        let var = self.variable(name)?;
        let values: Vec<f64> = var.get_values(..)?;
        if values.len() != self.shape.n_cells() {
            return Err(NpzbError::LengthMismatch {
                what: "grid variable",
                expected: self.shape.n_cells(),
                found: values.len(),
            });
        }
        Ok(values)
    }

    fn variable(&self, name: &str) -> Result<netcdf::Variable<'_>> {
        self.file
            .variable(name)
            .ok_or_else(|| NpzbError::MissingVariable(name.to_string()))
    }
}

/// Get f64 attribute value.
fn get_attr_f64(var: &netcdf::Variable, name: &str) -> Option<f64> {
    var.attribute_value(name)
        .and_then(|r| r.ok())
        .and_then(|v| match v {
            netcdf::AttributeValue::Double(d) => Some(d),
            netcdf::AttributeValue::Float(f) => Some(f as f64),
            netcdf::AttributeValue::Short(s) => Some(s as f64),
            netcdf::AttributeValue::Int(i) => Some(i as f64),
            _ => None,
        })
}

// ============================================================================
// Snapshot writer
// ============================================================================

/// Configuration for NetCDF snapshot output.
#[derive(Debug, Clone)]
pub struct SnapshotWriterConfig {
    /// Output file path
    pub path: String,
    /// Title attribute (CF-conventions)
    pub title: Option<String>,
    /// Institution attribute
    pub institution: Option<String>,
    /// Source attribute (model name/version)
    pub source: Option<String>,
    /// Comment attribute
    pub comment: Option<String>,
}

impl SnapshotWriterConfig {
    /// Create a new configuration with the given output path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: None,
            institution: None,
            source: Some(format!("npzb-rs {}", env!("CARGO_PKG_VERSION"))),
            comment: None,
        }
    }

    /// Set the title attribute.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the institution attribute.
    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = Some(institution.into());
        self
    }

    /// Set the comment attribute.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Streams snapshots into a CF-style NetCDF file.
pub struct SnapshotWriter {
    file: netcdf::FileMut,
    shape: GridShape,
    time_index: usize,
}

impl SnapshotWriter {
    /// Create the file, writing the mask and optional coordinates.
    pub fn create(
        config: SnapshotWriterConfig,
        mask: &SeaMask,
        coordinates: Option<(&[f64], &[f64])>,
    ) -> Result<Self> {
        let shape = mask.shape();
        let mut file = netcdf::create(&config.path)?;

        file.add_unlimited_dimension("time")?;
        file.add_dimension("y", shape.ny())?;
        file.add_dimension("x", shape.nx())?;

        {
            let mut time_var = file.add_variable::<f64>("time", &["time"])?;
            time_var.put_attribute("standard_name", "time")?;
            time_var.put_attribute("long_name", "model time")?;
            time_var.put_attribute("units", "seconds since model start")?;
        }

        {
            let sea: Vec<i32> = mask.flags().iter().map(|&s| i32::from(s)).collect();
            let mut mask_var = file.add_variable::<i32>("mask", &["y", "x"])?;
            mask_var.put_attribute("long_name", "land/sea mask")?;
            mask_var.put_attribute("flag_meanings", "land sea")?;
            mask_var.put_values(&sea, (.., ..))?;
        }

        if let Some((lat, lon)) = coordinates {
            {
                let mut lat_var = file.add_variable::<f64>("lat", &["y", "x"])?;
                lat_var.put_attribute("standard_name", "latitude")?;
                lat_var.put_attribute("units", "degrees_north")?;
                lat_var.put_values(lat, (.., ..))?;
            }
            {
                let mut lon_var = file.add_variable::<f64>("lon", &["y", "x"])?;
                lon_var.put_attribute("standard_name", "longitude")?;
                lon_var.put_attribute("units", "degrees_east")?;
                lon_var.put_values(lon, (.., ..))?;
            }
        }

        for tracer in Tracer::ALL {
            let mut var = file.add_variable::<f64>(tracer.symbol(), &["time", "y", "x"])?;
            var.put_attribute("long_name", tracer.long_name())?;
            var.put_attribute("units", "mmol N m-3")?;
            var.put_attribute("_FillValue", FILL_VALUE_F64)?;
            if coordinates.is_some() {
                var.put_attribute("coordinates", "lat lon")?;
            }
        }

        file.add_attribute("Conventions", "CF-1.8")?;
        if let Some(ref title) = config.title {
            file.add_attribute("title", title.as_str())?;
        }
        if let Some(ref institution) = config.institution {
            file.add_attribute("institution", institution.as_str())?;
        }
        if let Some(ref source) = config.source {
            file.add_attribute("source", source.as_str())?;
        }
        if let Some(ref comment) = config.comment {
            file.add_attribute("comment", comment.as_str())?;
        }

        let now = Utc::now();
        file.add_attribute(
            "history",
            format!("{}: Created by npzb-rs", now.format("%Y-%m-%d %H:%M:%S UTC")).as_str(),
        )?;

        debug!(path = %config.path, grid = %shape, "Created snapshot file");
        Ok(Self {
            file,
            shape,
            time_index: 0,
        })
    }

    /// Append one snapshot as the next time record.
    pub fn write_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        let t_idx = self.time_index;

        {
            let mut time_var = self
                .file
                .variable_mut("time")
                .ok_or_else(|| NpzbError::MissingVariable("time".to_string()))?;
            time_var.put_value(snapshot.time, [t_idx])?;
        }

        for tracer in Tracer::ALL {
            let field = snapshot.field(tracer);
            if field.shape() != self.shape {
                return Err(NpzbError::ShapeMismatch {
                    what: "snapshot field",
                    expected: self.shape,
                    found: field.shape(),
                });
            }
            let data = field.to_filled(FILL_VALUE_F64);
            let mut var = self
                .file
                .variable_mut(tracer.symbol())
                .ok_or_else(|| NpzbError::MissingVariable(tracer.symbol().to_string()))?;
            var.put_values(&data, (t_idx, .., ..))?;
        }

        self.time_index += 1;
        Ok(())
    }

    /// Write every snapshot of an archive to a new file.
    pub fn write_archive(
        config: SnapshotWriterConfig,
        mask: &SeaMask,
        coordinates: Option<(&[f64], &[f64])>,
        archive: &OutputArchive,
    ) -> Result<usize> {
        let mut writer = Self::create(config, mask, coordinates)?;
        for snapshot in archive {
            writer.write_snapshot(snapshot)?;
        }
        info!(records = writer.n_timesteps(), "Wrote snapshot archive");
        Ok(writer.n_timesteps())
    }

    /// Get the number of timesteps written.
    pub fn n_timesteps(&self) -> usize {
        self.time_index
    }
}

/// Write an archive using the mask and coordinates of its forcing.
pub fn write_archive_for<F: ForcingProvider + ?Sized>(
    config: SnapshotWriterConfig,
    forcing: &F,
    archive: &OutputArchive,
) -> Result<usize> {
    SnapshotWriter::write_archive(config, forcing.mask(), forcing.coordinates(), archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::NPZBState;
    use crate::types::SlotIndex;

    fn write_dataset(path: &Path, shape: GridShape) {
        let (ny, nx) = shape.as_tuple();
        let n = shape.n_cells();
        let mut file = netcdf::create(path).unwrap();
        file.add_dimension("time", 3).unwrap();
        file.add_dimension("y", ny).unwrap();
        file.add_dimension("x", nx).unwrap();

        let mut mask = vec![1.0; n];
        mask[0] = 0.0;
        file.add_variable::<f64>("time", &["time"])
            .unwrap()
            .put_values(&[0.0, 0.25, 0.5], ..)
            .unwrap();
        file.add_variable::<f64>("mask", &["y", "x"])
            .unwrap()
            .put_values(&mask, (.., ..))
            .unwrap();
        for name in ["dx", "dy"] {
            file.add_variable::<f64>(name, &["y", "x"])
                .unwrap()
                .put_values(&vec![250.0; n], (.., ..))
                .unwrap();
        }
        file.add_variable::<f64>("lat", &["y"])
            .unwrap()
            .put_values(&(0..ny).map(|j| 63.0 + j as f64).collect::<Vec<_>>(), ..)
            .unwrap();
        file.add_variable::<f64>("lon", &["x"])
            .unwrap()
            .put_values(&(0..nx).map(|i| 8.0 + i as f64).collect::<Vec<_>>(), ..)
            .unwrap();

        let mut u = vec![0.1; 3 * n];
        u[n + 5] = 1.0e4;
        file.add_variable::<f64>("u", &["time", "y", "x"])
            .unwrap()
            .put_values(&u, (.., .., ..))
            .unwrap();
        file.add_variable::<f64>("v", &["time", "y", "x"])
            .unwrap()
            .put_values(&vec![-0.05; 3 * n], (.., .., ..))
            .unwrap();
    }

    #[test]
    fn test_read_forcing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forcing.nc");
        let shape = GridShape::new(3, 4);
        write_dataset(&path, shape);

        let forcing = ForcingDatasetReader::from_file(&path).unwrap();
        assert_eq!(forcing.grid_shape(), shape);
        assert_eq!(forcing.forcing_times(), &[0.0, 21600.0, 43200.0]);
        assert!(forcing.mask().is_land(0, 0));
        assert_eq!(forcing.inverse_spacing().0[5], 1.0 / 250.0);

        let (u, v) = forcing.velocity_at_index(crate::types::ForcingIndex::new(1));
        assert_eq!(u.get(0, 0), None);
        assert_eq!(u.get(1, 1), None); // sentinel
        assert_eq!(u.get(1, 2), Some(0.1));
        assert_eq!(v.get(2, 3), Some(-0.05));

        let (lat, lon) = forcing.coordinates().unwrap();
        assert_eq!(lat[4], 64.0);
        assert_eq!(lon[4], 8.0);
    }

    #[test]
    fn test_missing_mask_variable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.nc");
        {
            let mut file = netcdf::create(&path).unwrap();
            file.add_dimension("y", 2).unwrap();
        }
        let err = ForcingDatasetReader::open(&path).err().unwrap();
        assert!(matches!(err, NpzbError::MissingVariable(ref v) if v == "mask"));
    }

    #[test]
    fn test_write_archive_fills_land() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.nc");
        let shape = GridShape::new(3, 3);
        let mut mask = SeaMask::all_sea(shape);
        mask.set_sea(0, 0, false);

        let mut state = NPZBState::new(mask.clone());
        state.initialize(Tracer::N, &crate::solver::GradientSpec::uniform(2.0));
        let mut archive = OutputArchive::new();
        archive.record(&state, SlotIndex::ZERO, 0.0, 0).unwrap();
        archive.record(&state, SlotIndex::ZERO, 3600.0, 6).unwrap();

        let config = SnapshotWriterConfig::new(path.to_string_lossy()).with_title("test");
        assert_eq!(SnapshotWriter::write_archive(config, &mask, None, &archive).unwrap(), 2);

        let file = netcdf::open(&path).unwrap();
        let times: Vec<f64> = file.variable("time").unwrap().get_values(..).unwrap();
        assert_eq!(times, vec![0.0, 3600.0]);
        let n: Vec<f64> = file.variable("N").unwrap().get_values((1, .., ..)).unwrap();
        assert_eq!(n[0], FILL_VALUE_F64);
        assert_eq!(n[4], 2.0);
    }
}
