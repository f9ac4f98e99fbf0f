//! Runtime diagnostics for NPZB simulations.
//!
//! Provides types for computing and tracking:
//! - Area-weighted inventories of N, P, Z, B and their total
//! - Field bounds (min/max over sea cells)
//! - Blow-up indicators (non-finite values, runaway inventory)
//! - Progress reporting for long simulations
//!
//! # Example
//!
//! ```
//! use npzb_rs::mesh::SeaMask;
//! use npzb_rs::solver::{DiagnosticsTracker, GradientSpec, NPZBDiagnostics, NPZBState, Tracer};
//! use npzb_rs::types::{GridShape, SlotIndex};
//!
//! let mask = SeaMask::closed_basin(GridShape::new(4, 4));
//! let mut state = NPZBState::new(mask);
//! state.initialize(Tracer::N, &GradientSpec::uniform(2.0));
//!
//! // 100 m × 100 m cells
//! let inv = vec![0.01; 16];
//! let diag = NPZBDiagnostics::compute(&state, SlotIndex::ZERO, &inv, &inv);
//! assert!((diag.inventory(Tracer::N) - 2.0 * 4.0 * 1.0e4).abs() < 1e-6);
//!
//! let tracker = DiagnosticsTracker::new(0.0, diag);
//! assert_eq!(tracker.inventory_drift(), 0.0);
//! ```

use tracing::info;

use crate::solver::{NPZBState, Tracer};
use crate::types::SlotIndex;

/// Bounds of one field over sea cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldBounds {
    pub min: f64,
    pub max: f64,
}

/// Diagnostic quantities of one model level.
#[derive(Clone, Debug, PartialEq)]
pub struct NPZBDiagnostics {
    /// Area-weighted inventory ∑ f·dx·dy per variable, in [`Tracer::ALL`] order
    pub inventories: [f64; 4],
    /// Bounds per variable, in [`Tracer::ALL`] order
    pub bounds: [FieldBounds; 4],
    /// Total sea area (m²)
    pub sea_area: f64,
    /// Whether every sea value is finite
    pub all_finite: bool,
}

impl NPZBDiagnostics {
    /// Compute diagnostics of one slot.
    ///
    /// Cell areas are `1 / (idx·idy)`.
    pub fn compute(state: &NPZBState, slot: SlotIndex, idx: &[f64], idy: &[f64]) -> Self {
        let sea = state.mask().flags();
        let mut inventories = [0.0; 4];
        let mut bounds = [FieldBounds {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }; 4];
        let mut sea_area = 0.0;
        let mut all_finite = true;

        for (k, _) in sea.iter().enumerate().filter(|(_, s)| **s) {
            let area = 1.0 / (idx[k] * idy[k]);
            sea_area += area;
            for tracer in Tracer::ALL {
                let value = state.field(tracer).slot(slot)[k];
                let t = tracer.index();
                if !value.is_finite() {
                    all_finite = false;
                }
                inventories[t] += value * area;
                bounds[t].min = bounds[t].min.min(value);
                bounds[t].max = bounds[t].max.max(value);
            }
        }

        Self {
            inventories,
            bounds,
            sea_area,
            all_finite,
        }
    }

    /// Inventory of one variable.
    pub fn inventory(&self, tracer: Tracer) -> f64 {
        self.inventories[tracer.index()]
    }

    /// Bounds of one variable.
    pub fn bounds(&self, tracer: Tracer) -> FieldBounds {
        self.bounds[tracer.index()]
    }

    /// Combined N + P + Z + B inventory.
    pub fn total_inventory(&self) -> f64 {
        self.inventories.iter().sum()
    }

    /// Area-weighted mean concentration of one variable.
    pub fn mean(&self, tracer: Tracer) -> f64 {
        if self.sea_area > 0.0 {
            self.inventory(tracer) / self.sea_area
        } else {
            0.0
        }
    }

    /// Format diagnostics as a single-line summary.
    pub fn summary_line(&self) -> String {
        format!(
            "N={:.4} P={:.4} Z={:.4} B={:.4} total={:.6e}",
            self.mean(Tracer::N),
            self.mean(Tracer::P),
            self.mean(Tracer::Z),
            self.mean(Tracer::B),
            self.total_inventory()
        )
    }

    /// Format diagnostics as detailed multi-line output.
    pub fn detailed(&self) -> String {
        let mut out = String::from("Inventories (mean, [min, max]):\n");
        for tracer in Tracer::ALL {
            let b = self.bounds(tracer);
            out.push_str(&format!(
                "  {:<14} {:.6e} ({:.4}, [{:.4}, {:.4}])\n",
                tracer.long_name(),
                self.inventory(tracer),
                self.mean(tracer),
                b.min,
                b.max
            ));
        }
        out.push_str(&format!("  total          {:.6e}", self.total_inventory()));
        out
    }
}

/// Track diagnostics over time for monitoring conservation and stability.
#[derive(Clone, Debug)]
pub struct DiagnosticsTracker {
    /// Initial diagnostics (for drift computation)
    initial: NPZBDiagnostics,
    /// Most recent diagnostics
    current: NPZBDiagnostics,
    /// Time of most recent update
    current_time: f64,
    /// Number of updates
    n_updates: usize,
    /// Largest relative total-inventory drift seen
    max_drift_seen: f64,
}

impl DiagnosticsTracker {
    /// Create a new tracker with initial diagnostics.
    pub fn new(time: f64, initial: NPZBDiagnostics) -> Self {
        Self {
            current: initial.clone(),
            initial,
            current_time: time,
            n_updates: 0,
            max_drift_seen: 0.0,
        }
    }

    /// Update tracker with new diagnostics.
    pub fn update(&mut self, time: f64, diag: NPZBDiagnostics) {
        self.current_time = time;
        self.n_updates += 1;
        self.current = diag;
        self.max_drift_seen = self.max_drift_seen.max(self.inventory_drift().abs());
    }

    /// Relative change of the total inventory since the start.
    ///
    /// Nonzero drift comes from transport through open boundaries, from the
    /// floors and from the mode filter (which does not touch B).
    pub fn inventory_drift(&self) -> f64 {
        let initial = self.initial.total_inventory();
        if initial.abs() > 1e-14 {
            (self.current.total_inventory() - initial) / initial.abs()
        } else {
            0.0
        }
    }

    /// Largest absolute drift seen so far.
    pub fn max_drift(&self) -> f64 {
        self.max_drift_seen
    }

    /// Get current diagnostics.
    pub fn current(&self) -> &NPZBDiagnostics {
        &self.current
    }

    /// Get initial diagnostics.
    pub fn initial(&self) -> &NPZBDiagnostics {
        &self.initial
    }

    /// Number of updates since creation.
    pub fn n_updates(&self) -> usize {
        self.n_updates
    }

    /// Check if simulation appears stable (no blow-up indicators).
    pub fn is_stable(&self) -> bool {
        if !self.current.all_finite || !self.current.total_inventory().is_finite() {
            return false;
        }
        // Inventory grown tenfold: the leapfrog mode has taken over
        self.inventory_drift() < 10.0
    }

    /// Log a summary of the simulation diagnostics.
    pub fn log_summary(&self) {
        info!(
            time_s = self.current_time,
            updates = self.n_updates,
            drift = self.inventory_drift(),
            max_drift = self.max_drift_seen,
            stable = self.is_stable(),
            "Diagnostics summary"
        );
        for tracer in Tracer::ALL {
            let b = self.current.bounds(tracer);
            info!(
                field = tracer.symbol(),
                inventory = self.current.inventory(tracer),
                mean = self.current.mean(tracer),
                min = b.min,
                max = b.max,
                "Field state"
            );
        }
    }
}

/// Progress reporter for long-running simulations.
#[derive(Clone, Debug)]
pub struct ProgressReporter {
    /// Start time of simulation (wall clock)
    start_instant: std::time::Instant,
    /// Model time at the start of the run
    start_time: f64,
    /// Model time to reach
    end_time: f64,
    /// Last reported progress percentage
    last_reported_pct: u32,
    /// Report interval in percentage points
    report_interval_pct: u32,
    /// Number of timesteps taken
    n_steps: usize,
}

impl ProgressReporter {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    /// * `start_time` - Model time at the start of the run (s)
    /// * `end_time` - Model time to reach (s)
    /// * `report_interval_pct` - Report every N percent (e.g., 10 for 10%, 20%, ...)
    pub fn new(start_time: f64, end_time: f64, report_interval_pct: u32) -> Self {
        Self {
            start_instant: std::time::Instant::now(),
            start_time,
            end_time,
            last_reported_pct: 0,
            report_interval_pct: report_interval_pct.max(1),
            n_steps: 0,
        }
    }

    /// Record a timestep.
    pub fn step(&mut self) {
        self.n_steps += 1;
    }

    /// Number of timesteps recorded.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Progress in percent for a model time.
    pub fn percent(&self, current_time: f64) -> f64 {
        let span = self.end_time - self.start_time;
        if span > 0.0 {
            ((current_time - self.start_time) / span * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        }
    }

    /// Check and report progress if threshold reached.
    ///
    /// Returns true if progress was reported.
    pub fn maybe_report(&mut self, current_time: f64, diag: Option<&NPZBDiagnostics>) -> bool {
        let pct = self.percent(current_time) as u32;
        let threshold = self.last_reported_pct + self.report_interval_pct;

        if pct >= threshold {
            self.report(current_time, diag);
            self.last_reported_pct = (pct / self.report_interval_pct) * self.report_interval_pct;
            true
        } else {
            false
        }
    }

    /// Force a progress report.
    pub fn report(&self, current_time: f64, diag: Option<&NPZBDiagnostics>) {
        let elapsed = self.start_instant.elapsed().as_secs_f64();
        let pct = self.percent(current_time);

        let eta = if pct > 0.1 {
            format_duration(elapsed * 100.0 / pct - elapsed)
        } else {
            "calculating...".to_string()
        };
        let steps_per_sec = if elapsed > 0.0 {
            self.n_steps as f64 / elapsed
        } else {
            0.0
        };

        match diag {
            Some(d) => info!(
                "[{:>5.1}%] t={:.0}s | elapsed={} | ETA={} | {:.0} steps/s | {}",
                pct,
                current_time,
                format_duration(elapsed),
                eta,
                steps_per_sec,
                d.summary_line()
            ),
            None => info!(
                "[{:>5.1}%] t={:.0}s | elapsed={} | ETA={} | {:.0} steps/s",
                pct,
                current_time,
                format_duration(elapsed),
                eta,
                steps_per_sec
            ),
        }
    }

    /// Log final summary.
    pub fn finish(&self, final_time: f64, tracker: Option<&DiagnosticsTracker>) {
        let elapsed = self.start_instant.elapsed().as_secs_f64();
        let steps_per_sec = if elapsed > 0.0 {
            self.n_steps as f64 / elapsed
        } else {
            0.0
        };
        info!(
            "Simulation complete: t={:.0}s ({:.2} days), {} steps in {} ({:.1} steps/s)",
            final_time,
            final_time / 86_400.0,
            self.n_steps,
            format_duration(elapsed),
            steps_per_sec
        );
        if let Some(t) = tracker {
            t.log_summary();
        }
    }
}

/// Format a duration in seconds as human-readable string.
pub fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        let s = secs - mins * 60.0;
        format!("{:.0}m{:.0}s", mins, s)
    } else {
        let hours = (secs / 3600.0).floor();
        let mins = ((secs - hours * 3600.0) / 60.0).floor();
        format!("{:.0}h{:.0}m", hours, mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::SeaMask;
    use crate::solver::GradientSpec;
    use crate::types::{CellRegion, GridShape};
    use approx::assert_relative_eq;

    fn state() -> NPZBState {
        let mut state = NPZBState::new(SeaMask::all_sea(GridShape::new(2, 4)));
        state.initialize(
            Tracer::P,
            &GradientSpec {
                inside: 3.0,
                outside: 1.0,
                region: CellRegion::new(0, 2, 0, 2),
            },
        );
        state.initialize(Tracer::B, &GradientSpec::uniform(0.5));
        state
    }

    #[test]
    fn test_inventory_area_weighted() {
        let state = state();
        let idx = vec![0.5; 8]; // dx = 2
        let idy = vec![0.25; 8]; // dy = 4
        let diag = NPZBDiagnostics::compute(&state, SlotIndex::ZERO, &idx, &idy);
        assert_relative_eq!(diag.sea_area, 64.0);
        assert_relative_eq!(diag.inventory(Tracer::P), (4.0 * 3.0 + 4.0 * 1.0) * 8.0);
        assert_relative_eq!(diag.mean(Tracer::P), 2.0);
        assert_eq!(diag.bounds(Tracer::P), FieldBounds { min: 1.0, max: 3.0 });
        assert_relative_eq!(diag.total_inventory(), 16.0 * 8.0 + 0.5 * 64.0);
        assert!(diag.all_finite);
    }

    #[test]
    fn test_land_excluded() {
        let mut state = NPZBState::new(SeaMask::closed_basin(GridShape::new(3, 3)));
        state.initialize(Tracer::N, &GradientSpec::uniform(1.0));
        let diag = NPZBDiagnostics::compute(&state, SlotIndex::ZERO, &[1.0; 9], &[1.0; 9]);
        assert_eq!(diag.inventory(Tracer::N), 1.0);
        assert!(diag.all_finite);
    }

    #[test]
    fn test_tracker_drift_and_stability() {
        let state = state();
        let inv = vec![1.0; 8];
        let initial = NPZBDiagnostics::compute(&state, SlotIndex::ZERO, &inv, &inv);
        let mut tracker = DiagnosticsTracker::new(0.0, initial.clone());

        let mut grown = initial.clone();
        grown.inventories[0] += 0.1 * initial.total_inventory();
        tracker.update(600.0, grown);
        assert_relative_eq!(tracker.inventory_drift(), 0.1, epsilon = 1e-12);
        assert!(tracker.is_stable());

        let mut broken = initial;
        broken.all_finite = false;
        tracker.update(1200.0, broken);
        assert!(!tracker.is_stable());
        assert_relative_eq!(tracker.max_drift(), 0.1, epsilon = 1e-12);
        assert_eq!(tracker.n_updates(), 2);
    }

    #[test]
    fn test_progress_thresholds() {
        let mut progress = ProgressReporter::new(100.0, 200.0, 25);
        assert!(!progress.maybe_report(110.0, None));
        assert!(progress.maybe_report(126.0, None));
        assert!(!progress.maybe_report(140.0, None));
        assert!(progress.maybe_report(200.0, None));
        assert_eq!(progress.percent(250.0), 100.0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(5.0), "5.0s");
        assert_eq!(format_duration(125.0), "2m5s");
        assert_eq!(format_duration(7260.0), "2h1m");
    }
}
