//! Simulation runner implementation.
//!
//! Drives a [`LeapfrogIntegrator`] until its forcing is exhausted (or a
//! step cap is hit), archiving the freshest level at a fixed model-time
//! interval and reporting progress through `tracing`.

use tracing::{info, warn};

use super::archive::{OutputArchive, Snapshot};
use crate::error::{NpzbError, Result};
use crate::forcing::ForcingProvider;
use crate::solver::{DiagnosticsTracker, NPZBDiagnostics, NPZBState, ProgressReporter};
use crate::time::{IntegratorInfo, LeapfrogIntegrator};

// =============================================================================
// Simulation Configuration
// =============================================================================

/// Configuration for a simulation run.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Model time between archived samples (s).
    pub output_interval: f64,
    /// Maximum number of time steps.
    pub max_steps: Option<usize>,
    /// Log progress every N percent; `None` disables progress output.
    pub progress_interval_pct: Option<u32>,
    /// Compute inventory diagnostics at every sample.
    pub track_diagnostics: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            output_interval: 86_400.0,
            max_steps: None,
            progress_interval_pct: Some(10),
            track_diagnostics: true,
        }
    }
}

// =============================================================================
// Simulation Result
// =============================================================================

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The next step needed forcing past the last sample.
    ForcingExhausted,
    /// The configured step cap was reached.
    MaxSteps,
}

/// Result of a simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// Final model time reached (s).
    pub final_time: f64,
    /// Total number of time steps taken.
    pub n_steps: usize,
    /// Total wall-clock time in seconds.
    pub wall_time: f64,
    /// Why the run ended.
    pub stop_reason: StopReason,
    /// Archived samples, starting with the initial state.
    pub archive: OutputArchive,
    /// Model state after the last step.
    pub final_state: NPZBState,
    /// Inventory tracking, if enabled.
    pub diagnostics: Option<DiagnosticsTracker>,
}

// =============================================================================
// Simulation Runner
// =============================================================================

/// High-level simulation runner.
///
/// # Example
/// ```
/// use npzb_rs::config::ModelConfig;
/// use npzb_rs::forcing::InMemoryForcing;
/// use npzb_rs::mesh::SeaMask;
/// use npzb_rs::simulation::Simulation;
/// use npzb_rs::time::LeapfrogIntegrator;
/// use npzb_rs::types::GridShape;
///
/// let mask = SeaMask::closed_basin(GridShape::new(6, 10));
/// let times: Vec<f64> = (0..7).map(|h| h as f64 * 3600.0).collect();
/// let forcing = InMemoryForcing::uniform(mask, 500.0, 500.0, times, 0.02, 0.01).unwrap();
/// let integrator = LeapfrogIntegrator::from_config(&forcing, ModelConfig::default()).unwrap();
///
/// let result = Simulation::new(integrator)
///     .with_output_interval(7200.0)
///     .run()
///     .unwrap();
///
/// // Samples at 0, 2, 4 and 6 hours
/// assert_eq!(result.archive.times(), vec![0.0, 7200.0, 14400.0, 21600.0]);
/// assert_eq!(result.n_steps, 36);
/// ```
pub struct Simulation<'a, F: ForcingProvider + ?Sized> {
    integrator: LeapfrogIntegrator<'a, F>,
    config: SimulationConfig,
}

impl<'a, F: ForcingProvider + ?Sized> Simulation<'a, F> {
    /// Create a new simulation around an integrator.
    pub fn new(integrator: LeapfrogIntegrator<'a, F>) -> Self {
        Self {
            integrator,
            config: SimulationConfig::default(),
        }
    }

    /// Replace the whole run configuration.
    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the model time between archived samples (s).
    pub fn with_output_interval(mut self, interval: f64) -> Self {
        self.config.output_interval = interval;
        self
    }

    /// Set the maximum number of steps.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.config.max_steps = Some(max_steps);
        self
    }

    /// Set the progress reporting interval in percent.
    pub fn with_progress_interval(mut self, pct: u32) -> Self {
        self.config.progress_interval_pct = Some(pct);
        self
    }

    /// Disable progress reporting.
    pub fn quiet(mut self) -> Self {
        self.config.progress_interval_pct = None;
        self
    }

    /// Enable or disable inventory diagnostics.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.config.track_diagnostics = enabled;
        self
    }

    /// Get a reference to the time integrator.
    pub fn integrator(&self) -> &LeapfrogIntegrator<'a, F> {
        &self.integrator
    }

    /// Run until the forcing is exhausted or the step cap is reached.
    pub fn run(self) -> Result<SimulationResult> {
        self.run_with_callback(|_| {})
    }

    /// Run the simulation, calling `callback` with every archived sample.
    ///
    /// The initial state is archived (and passed to the callback) as sample 0.
    ///
    /// # Errors
    /// - `InvalidConfig` if the output interval is not positive
    /// - Any integrator error other than forcing exhaustion
    pub fn run_with_callback<C>(self, mut callback: C) -> Result<SimulationResult>
    where
        C: FnMut(&Snapshot),
    {
        let Self {
            mut integrator,
            config,
        } = self;
        if !(config.output_interval.is_finite() && config.output_interval > 0.0) {
            return Err(NpzbError::InvalidConfig(format!(
                "output interval must be positive, got {}",
                config.output_interval
            )));
        }

        let start_wall = std::time::Instant::now();
        let forcing = integrator.forcing();
        let (idx, idy) = forcing.inverse_spacing();
        let dt = integrator.dt();

        let planned = match config.max_steps {
            Some(cap) => integrator.remaining_steps().min(cap),
            None => integrator.remaining_steps(),
        };
        let t_start = integrator.time();
        let t_end = t_start + planned as f64 * dt;

        info!(
            integrator = integrator.name(),
            order = integrator.order(),
            dt,
            t_start,
            t_end,
            planned_steps = planned,
            output_interval = config.output_interval,
            "Starting simulation"
        );

        let mut archive = OutputArchive::new();
        let snapshot = archive.record(integrator.state(), integrator.fresh_slot(), t_start, 0)?;
        callback(snapshot);

        let mut tracker = config.track_diagnostics.then(|| {
            let diag = NPZBDiagnostics::compute(integrator.state(), integrator.fresh_slot(), idx, idy);
            DiagnosticsTracker::new(t_start, diag)
        });
        let mut progress = config
            .progress_interval_pct
            .map(|pct| ProgressReporter::new(t_start, t_end, pct));

        let tolerance = 1e-9 * config.output_interval;
        let mut next_sample = t_start + config.output_interval;
        let mut n_steps = 0;

        let stop_reason = loop {
            if let Some(cap) = config.max_steps
                && n_steps >= cap
            {
                break StopReason::MaxSteps;
            }

            let step = match integrator.step() {
                Ok(step) => step,
                Err(NpzbError::ForcingExhausted { .. }) => break StopReason::ForcingExhausted,
                Err(err) => return Err(err),
            };
            n_steps += 1;
            if let Some(p) = progress.as_mut() {
                p.step();
            }

            if step.time + tolerance >= next_sample {
                let snapshot =
                    archive.record(integrator.state(), step.slot, step.time, n_steps)?;
                callback(snapshot);
                while next_sample <= step.time + tolerance {
                    next_sample += config.output_interval;
                }

                if let Some(t) = tracker.as_mut() {
                    t.update(
                        step.time,
                        NPZBDiagnostics::compute(integrator.state(), step.slot, idx, idy),
                    );
                    if !t.is_stable() {
                        warn!(
                            time = step.time,
                            drift = t.inventory_drift(),
                            "Simulation appears unstable"
                        );
                    }
                }
            }

            if let Some(p) = progress.as_mut() {
                p.maybe_report(step.time, tracker.as_ref().map(|t| t.current()));
            }
        };

        let final_time = integrator.time();
        let wall_time = start_wall.elapsed().as_secs_f64();
        match progress.as_ref() {
            Some(p) => p.finish(final_time, tracker.as_ref()),
            None => info!(
                final_time,
                n_steps,
                samples = archive.len(),
                wall_time,
                "Simulation complete"
            ),
        }

        Ok(SimulationResult {
            final_time,
            n_steps,
            wall_time,
            stop_reason,
            archive,
            final_state: integrator.into_state(),
            diagnostics: tracker,
        })
    }
}
