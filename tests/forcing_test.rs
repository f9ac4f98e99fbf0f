//! Integration tests for forcing providers and run configuration.

use approx::assert_relative_eq;
use npzb_rs::config::{BiologyConfig, ModelConfig};
use npzb_rs::forcing::{ForcingProvider, InMemoryForcing, VelocityInterpolator};
use npzb_rs::mesh::{MaskedField, SeaMask};
use npzb_rs::time::LeapfrogIntegrator;
use npzb_rs::types::{ForcingIndex, GridShape};
use npzb_rs::{NpzbError, Tracer};

/// Tidal-like forcing that flips the current every sample, built on the fly.
struct AlternatingCurrent {
    mask: SeaMask,
    idx: Vec<f64>,
    times: Vec<f64>,
    east: MaskedField,
    west: MaskedField,
    calm: MaskedField,
}

impl AlternatingCurrent {
    fn new(shape: GridShape, n_samples: usize, interval: f64, speed: f64) -> Self {
        let mask = SeaMask::closed_basin(shape);
        let n = shape.n_cells();
        let raw_east = vec![speed; n];
        let raw_west = vec![-speed; n];
        Self {
            idx: vec![1.0 / 400.0; n],
            times: (0..n_samples).map(|k| k as f64 * interval).collect(),
            east: MaskedField::from_raw(&raw_east, &mask, 1.0e3).unwrap(),
            west: MaskedField::from_raw(&raw_west, &mask, 1.0e3).unwrap(),
            calm: MaskedField::constant(shape, 0.0),
            mask,
        }
    }
}

impl ForcingProvider for AlternatingCurrent {
    fn grid_shape(&self) -> GridShape {
        self.mask.shape()
    }

    fn mask(&self) -> &SeaMask {
        &self.mask
    }

    fn inverse_spacing(&self) -> (&[f64], &[f64]) {
        (&self.idx, &self.idx)
    }

    fn forcing_times(&self) -> &[f64] {
        &self.times
    }

    fn velocity_at_index(&self, k: ForcingIndex) -> (&MaskedField, &MaskedField) {
        if k.get() % 2 == 0 {
            (&self.east, &self.calm)
        } else {
            (&self.west, &self.calm)
        }
    }
}

#[test]
fn test_interpolation_between_reversing_samples() {
    let forcing = AlternatingCurrent::new(GridShape::new(5, 6), 4, 1800.0, 0.3);
    let mut interp = VelocityInterpolator::new(forcing.grid_shape());

    interp.interpolate(&forcing, 1800.0).unwrap();
    assert_eq!(interp.u().get(2, 2), Some(-0.3));

    // Slack water halfway between flood and ebb
    interp.interpolate(&forcing, 2700.0).unwrap();
    assert_relative_eq!(interp.u().get(2, 2).unwrap(), 0.0, epsilon = 1e-15);
    assert_eq!(interp.u().get(0, 0), None);
    assert_eq!(interp.v().get(0, 0), Some(0.0));

    let err = interp.interpolate(&forcing, 5400.0).unwrap_err();
    assert!(matches!(err, NpzbError::ForcingExhausted { forcing_end, .. } if forcing_end == 5400.0));
}

#[test]
fn test_integrator_runs_on_custom_provider() {
    let forcing = AlternatingCurrent::new(GridShape::new(8, 10), 5, 3600.0, 0.1);
    let config = ModelConfig::default().with_dt(300.0);
    let mut integrator = LeapfrogIntegrator::from_config(&forcing, config).unwrap();
    assert_eq!(integrator.remaining_steps(), 48);

    let last = integrator.by_ref().last().unwrap();
    assert_eq!(last.step, 47);
    assert_relative_eq!(last.time, 4.0 * 3600.0);

    let state = integrator.state();
    let mean_n = state.mean(Tracer::N, last.slot).unwrap();
    assert!(mean_n.is_finite() && mean_n > 0.0);
}

#[test]
fn test_start_time_inside_forcing_window() {
    let mask = SeaMask::closed_basin(GridShape::new(5, 5));
    let times: Vec<f64> = (0..5).map(|h| h as f64 * 3600.0).collect();
    let forcing = InMemoryForcing::uniform(mask, 300.0, 300.0, times, 0.0, 0.0).unwrap();

    let integrator = LeapfrogIntegrator::from_config(&forcing, ModelConfig::default())
        .unwrap()
        .with_start_time(2.0 * 3600.0);
    assert_eq!(integrator.remaining_steps(), 12);
    assert_eq!(integrator.count(), 12);
}

#[test]
fn test_config_file_drives_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fjord.json");
    std::fs::write(
        &path,
        r#"{
            "biology": { "Vm": 0.0, "Rm": 0.0, "m": 0.0, "g": 0.0, "alpha": 0.0 },
            "At": 0.0,
            "dt": 900.0,
            "navg": 4,
            "vertical_coupling": false
        }"#,
    )
    .unwrap();

    let config = ModelConfig::from_json_file(&path).unwrap();
    assert_eq!(config.dt, 900.0);
    assert_eq!(config.biology.ks, BiologyConfig::default().ks);
    assert_eq!(config.floors.min_n, 1e-5);

    let reloaded = ModelConfig::from_json_str(&config.to_json_string().unwrap()).unwrap();
    assert_eq!(reloaded, config);

    let mask = SeaMask::closed_basin(GridShape::new(6, 6));
    let times: Vec<f64> = (0..3).map(|h| h as f64 * 3600.0).collect();
    let forcing = InMemoryForcing::uniform(mask, 200.0, 200.0, times, 0.0, 0.0).unwrap();
    let mut integrator = LeapfrogIntegrator::from_config(&forcing, config).unwrap();
    assert_eq!(integrator.by_ref().count(), 8);
    assert!(integrator.vertical_velocity().iter().all(|&w| w == 0.0));
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{ "dt": -60.0 }"#).unwrap();
    assert!(matches!(
        ModelConfig::from_json_file(&path),
        Err(NpzbError::InvalidConfig(_))
    ));

    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        ModelConfig::from_json_file(&path),
        Err(NpzbError::Json(_))
    ));
}
