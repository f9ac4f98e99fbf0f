//! Model configuration.
//!
//! All options have defaults, so a configuration file only needs to name
//! what it changes. Biological rates are given per day, as in the
//! literature; [`BiologyConfig::to_rates`] converts them to per-second
//! rates for the integrator.
//!
//! # Example
//!
//! ```
//! use npzb_rs::config::ModelConfig;
//!
//! let config = ModelConfig::from_json_str(r#"{ "biology": { "alpha": 0.2 }, "At": 5.0 }"#).unwrap();
//! assert_eq!(config.biology.alpha, 0.2);
//! assert_eq!(config.biology.vm, 2.0); // default
//! assert_eq!(config.diffusivity, 5.0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NpzbError, Result};
use crate::solver::{GradientSpec, Tracer};
use crate::source::BiologyRates;
use crate::types::{CellRegion, GridShape};

/// Seconds per day, for rate conversion.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

// ============================================================================
// Biology
// ============================================================================

/// Biological parameters in literature units (rates per day).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiologyConfig {
    /// Maximum nutrient uptake rate by phytoplankton (1/day)
    #[serde(rename = "Vm")]
    pub vm: f64,
    /// Half-saturation constant for uptake (concentration)
    pub ks: f64,
    /// Phytoplankton mortality (1/day)
    pub m: f64,
    /// Sinking export of phytoplankton to the benthos (1/day)
    pub alpha: f64,
    /// Fraction of grazing returned directly to nutrients
    pub gamma: f64,
    /// Maximum grazing rate (1/day)
    #[serde(rename = "Rm")]
    pub rm: f64,
    /// Ivlev constant (1/concentration)
    pub ivlev: f64,
    /// Zooplankton mortality (1/day)
    pub g: f64,
}

impl Default for BiologyConfig {
    fn default() -> Self {
        Self {
            vm: 2.0,
            ks: 1.0,
            m: 0.1,
            alpha: 0.0025,
            gamma: 0.3,
            rm: 1.5,
            ivlev: 1.0,
            g: 0.2,
        }
    }
}

impl BiologyConfig {
    /// Parameter set with strong benthic export (alpha = 0.2 /day).
    pub fn high_export() -> Self {
        Self {
            alpha: 0.2,
            ..Self::default()
        }
    }

    /// All rates zero: no uptake, mortality, grazing or export.
    pub fn inert() -> Self {
        Self {
            vm: 0.0,
            m: 0.0,
            alpha: 0.0,
            rm: 0.0,
            g: 0.0,
            ..Self::default()
        }
    }

    /// Convert to per-second rates.
    pub fn to_rates(&self) -> BiologyRates {
        BiologyRates {
            vm: self.vm / SECONDS_PER_DAY,
            ks: self.ks,
            m: self.m / SECONDS_PER_DAY,
            alpha: self.alpha / SECONDS_PER_DAY,
            gamma: self.gamma,
            rm: self.rm / SECONDS_PER_DAY,
            ivlev: self.ivlev,
            g: self.g / SECONDS_PER_DAY,
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("Vm", self.vm),
            ("ks", self.ks),
            ("m", self.m),
            ("alpha", self.alpha),
            ("Rm", self.rm),
            ("ivlev", self.ivlev),
            ("g", self.g),
        ] {
            non_negative(name, value)?;
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(NpzbError::InvalidConfig(format!(
                "gamma must lie in [0, 1], got {}",
                self.gamma
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Initial conditions and floors
// ============================================================================

/// Concentrations inside and outside the initial region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelPair {
    /// Level inside the region
    pub inside: f64,
    /// Level everywhere else
    pub outside: f64,
}

impl LevelPair {
    /// Create a level pair.
    pub fn new(inside: f64, outside: f64) -> Self {
        Self { inside, outside }
    }

    /// Same level in both regions.
    pub fn uniform(level: f64) -> Self {
        Self::new(level, level)
    }
}

/// Two-region step profile for the initial state.
///
/// When `region` is unset, the inner region is every column west of
/// `west_fraction * nx` (the inner fjord).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConditions {
    /// Nutrient levels
    #[serde(rename = "N0")]
    pub n0: LevelPair,
    /// Phytoplankton levels
    #[serde(rename = "P0")]
    pub p0: LevelPair,
    /// Zooplankton levels
    #[serde(rename = "Z0")]
    pub z0: LevelPair,
    /// Benthos levels
    #[serde(rename = "B0")]
    pub b0: LevelPair,
    /// Explicit inner region (cells)
    pub region: Option<CellRegion>,
    /// Fraction of the grid width used as the inner region when `region` is unset
    pub west_fraction: f64,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            n0: LevelPair::new(2.0, 1.0),
            p0: LevelPair::new(0.5, 0.25),
            z0: LevelPair::new(0.25, 0.125),
            b0: LevelPair::new(0.5, 0.5),
            region: None,
            west_fraction: 0.5,
        }
    }
}

impl InitialConditions {
    /// Same level everywhere for every field.
    pub fn uniform(n0: f64, p0: f64, z0: f64, b0: f64) -> Self {
        Self {
            n0: LevelPair::uniform(n0),
            p0: LevelPair::uniform(p0),
            z0: LevelPair::uniform(z0),
            b0: LevelPair::uniform(b0),
            ..Self::default()
        }
    }

    /// Inner region resolved against a grid.
    pub fn region_for(&self, shape: GridShape) -> CellRegion {
        match self.region {
            Some(region) => region.clipped(shape),
            None => {
                let cutoff = (self.west_fraction * shape.nx() as f64).round() as usize;
                CellRegion::west_of(shape, cutoff)
            }
        }
    }

    /// Step profile for one field on a grid.
    pub fn gradient_spec(&self, tracer: Tracer, shape: GridShape) -> GradientSpec {
        let levels = match tracer {
            Tracer::N => self.n0,
            Tracer::P => self.p0,
            Tracer::Z => self.z0,
            Tracer::B => self.b0,
        };
        GradientSpec {
            inside: levels.inside,
            outside: levels.outside,
            region: self.region_for(shape),
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, levels) in [("N0", self.n0), ("P0", self.p0), ("Z0", self.z0), ("B0", self.b0)] {
            non_negative(name, levels.inside)?;
            non_negative(name, levels.outside)?;
        }
        if !(0.0..=1.0).contains(&self.west_fraction) {
            return Err(NpzbError::InvalidConfig(format!(
                "west_fraction must lie in [0, 1], got {}",
                self.west_fraction
            )));
        }
        Ok(())
    }
}

/// Lower bounds applied to every field after each step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorValues {
    #[serde(rename = "min_N")]
    pub min_n: f64,
    #[serde(rename = "min_P")]
    pub min_p: f64,
    #[serde(rename = "min_Z")]
    pub min_z: f64,
    #[serde(rename = "min_B")]
    pub min_b: f64,
}

impl Default for FloorValues {
    fn default() -> Self {
        Self {
            min_n: 1e-5,
            min_p: 1e-5,
            min_z: 1e-5,
            min_b: 1e-5,
        }
    }
}

impl FloorValues {
    /// Floor for one field.
    pub fn get(&self, tracer: Tracer) -> f64 {
        match tracer {
            Tracer::N => self.min_n,
            Tracer::P => self.min_p,
            Tracer::Z => self.min_z,
            Tracer::B => self.min_b,
        }
    }

    fn validate(&self) -> Result<()> {
        for tracer in Tracer::ALL {
            let floor = self.get(tracer);
            if !(floor.is_finite() && floor > 0.0) {
                return Err(NpzbError::InvalidConfig(format!(
                    "floor for {} must be positive, got {}",
                    tracer, floor
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Model configuration
// ============================================================================

/// Complete model configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Biological parameters
    pub biology: BiologyConfig,
    /// Horizontal eddy diffusivity (m²/s)
    #[serde(rename = "At")]
    pub diffusivity: f64,
    /// Integration time step (s)
    pub dt: f64,
    /// Apply the computational-mode filter every `navg` steps
    pub navg: usize,
    /// Couple N and B through the vertical velocity
    pub vertical_coupling: bool,
    /// Initial two-region profile
    pub initial: InitialConditions,
    /// Lower bounds per field
    pub floors: FloorValues,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            biology: BiologyConfig::default(),
            diffusivity: 20.0,
            dt: 600.0,
            navg: 24,
            vertical_coupling: true,
            initial: InitialConditions::default(),
            floors: FloorValues::default(),
        }
    }
}

impl ModelConfig {
    /// Set the biological parameters.
    pub fn with_biology(mut self, biology: BiologyConfig) -> Self {
        self.biology = biology;
        self
    }

    /// Set the horizontal diffusivity (m²/s).
    pub fn with_diffusivity(mut self, at: f64) -> Self {
        self.diffusivity = at;
        self
    }

    /// Set the time step (s).
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set the mode-filter cadence (steps).
    pub fn with_navg(mut self, navg: usize) -> Self {
        self.navg = navg;
        self
    }

    /// Enable/disable vertical N–B coupling.
    pub fn with_vertical_coupling(mut self, enabled: bool) -> Self {
        self.vertical_coupling = enabled;
        self
    }

    /// Set the initial conditions.
    pub fn with_initial(mut self, initial: InitialConditions) -> Self {
        self.initial = initial;
        self
    }

    /// Set the floors.
    pub fn with_floors(mut self, floors: FloorValues) -> Self {
        self.floors = floors;
        self
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        self.biology.validate()?;
        self.initial.validate()?;
        self.floors.validate()?;
        non_negative("At", self.diffusivity)?;
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(NpzbError::InvalidConfig(format!(
                "dt must be positive, got {}",
                self.dt
            )));
        }
        if self.navg == 0 {
            return Err(NpzbError::InvalidConfig("navg must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(NpzbError::InvalidConfig(format!(
            "{} must be finite and non-negative, got {}",
            name, value
        )));
    }
    Ok(())
}
