//! Leapfrog integrator for the coupled NPZB system.
//!
//! One step at model time t:
//!
//! 1. interpolate u, v to t
//! 2. compute the fallback means, w and the reaction tendencies from the
//!    current level
//! 3. write the next level of N, P, Z (advection, diffusion, reaction)
//!    and B (reaction only)
//! 4. clamp every level to the floors, filter N, P, Z every `navg` steps,
//!    then rotate the levels
//!
//! The integrator is a cursor: call [`LeapfrogIntegrator::step`] until it
//! returns [`NpzbError::ForcingExhausted`], or iterate over it.
//!
//! # Example
//!
//! ```
//! use npzb_rs::config::ModelConfig;
//! use npzb_rs::forcing::InMemoryForcing;
//! use npzb_rs::mesh::SeaMask;
//! use npzb_rs::time::LeapfrogIntegrator;
//! use npzb_rs::types::GridShape;
//!
//! let mask = SeaMask::closed_basin(GridShape::new(6, 8));
//! let times: Vec<f64> = (0..4).map(|h| h as f64 * 3600.0).collect();
//! let forcing = InMemoryForcing::uniform(mask, 500.0, 500.0, times, 0.05, 0.0).unwrap();
//!
//! let integrator = LeapfrogIntegrator::from_config(&forcing, ModelConfig::default()).unwrap();
//! // 3 hours of forcing at 600 s per step
//! assert_eq!(integrator.count(), 18);
//! ```

use tracing::{debug, trace};

use super::filter::mode_filter;
use super::integrator::IntegratorInfo;
use crate::config::ModelConfig;
use crate::error::{NpzbError, Result};
use crate::forcing::{ForcingProvider, VelocityInterpolator};
use crate::mesh::MaskedField;
use crate::solver::rhs::{FallbackMeans, FieldUpdate, StencilGrid, compute_reactions};
use crate::solver::{NPZBState, Tracer};
use crate::source::{
    CombinedReaction, NPZBiology, ReactionSource, Tendencies, VerticalExchange,
};
use crate::types::SlotIndex;

/// Outcome of one completed step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepResult {
    /// Index n of the step just taken (0-based)
    pub step: usize,
    /// Slot now holding the newest level
    pub slot: SlotIndex,
    /// Model time reached (s)
    pub time: f64,
    /// Whether the mode filter ran on this step
    pub filtered: bool,
}

/// Leapfrog time stepper over borrowed forcing.
pub struct LeapfrogIntegrator<'a, F: ForcingProvider + ?Sized> {
    forcing: &'a F,
    state: NPZBState,
    config: ModelConfig,
    biology: NPZBiology,
    extra_sources: Vec<Box<dyn ReactionSource>>,
    interp: VelocityInterpolator,
    w: Vec<f64>,
    reactions: Vec<Tendencies>,
    t0: f64,
    steps_done: usize,
    stopped: Option<NpzbError>,
}

impl<'a, F: ForcingProvider + ?Sized> LeapfrogIntegrator<'a, F> {
    /// Create an integrator for an initialized state.
    ///
    /// The state is clamped to the configured floors before the first step.
    /// Model time starts at the first forcing sample.
    ///
    /// # Errors
    /// - `InvalidConfig` if the configuration does not validate
    /// - `ShapeMismatch` if the state and forcing grids differ
    /// - `MaskMismatch` if they disagree on which cells are sea
    /// - `InvalidForcing` if the forcing has fewer than two samples
    pub fn new(forcing: &'a F, mut state: NPZBState, config: ModelConfig) -> Result<Self> {
        config.validate()?;
        if forcing.n_samples() < 2 {
            return Err(NpzbError::InvalidForcing(format!(
                "need at least 2 forcing samples, found {}",
                forcing.n_samples()
            )));
        }
        let shape = forcing.grid_shape();
        if state.shape() != shape {
            return Err(NpzbError::ShapeMismatch {
                what: "model state",
                expected: shape,
                found: state.shape(),
            });
        }
        match state.mask().count_differences(forcing.mask()) {
            Some(0) => {}
            Some(differing) => return Err(NpzbError::MaskMismatch { differing }),
            None => {
                return Err(NpzbError::ShapeMismatch {
                    what: "forcing mask",
                    expected: shape,
                    found: forcing.mask().shape(),
                });
            }
        }
        for tracer in Tracer::ALL {
            state.clamp_min(tracer, config.floors.get(tracer));
        }

        let n = shape.n_cells();
        let t0 = forcing.forcing_times()[0];
        debug!(
            grid = %shape,
            sea_cells = state.mask().sea_count(),
            dt = config.dt,
            navg = config.navg,
            vertical_coupling = config.vertical_coupling,
            t0,
            "Created leapfrog integrator"
        );

        Ok(Self {
            forcing,
            state,
            biology: NPZBiology::new(config.biology.to_rates()),
            config,
            extra_sources: Vec::new(),
            interp: VelocityInterpolator::new(shape),
            w: vec![0.0; n],
            reactions: vec![Tendencies::zero(); n],
            t0,
            steps_done: 0,
            stopped: None,
        })
    }

    /// Create an integrator whose state is initialized from `config.initial`.
    pub fn from_config(forcing: &'a F, config: ModelConfig) -> Result<Self> {
        let mut state = NPZBState::new(forcing.mask().clone());
        for tracer in Tracer::ALL {
            let spec = config.initial.gradient_spec(tracer, state.shape());
            state.initialize(tracer, &spec);
        }
        Self::new(forcing, state, config)
    }

    /// Start the model clock at `t0` instead of the first forcing sample.
    pub fn with_start_time(mut self, t0: f64) -> Self {
        self.t0 = t0;
        self
    }

    /// Add a reaction source evaluated alongside the biology.
    pub fn with_source(mut self, source: Box<dyn ReactionSource>) -> Self {
        self.extra_sources.push(source);
        self
    }

    /// Advance one step.
    ///
    /// On error the state is left untouched and the step can be retried
    /// only if the cause was transient (it never is for forcing exhaustion).
    pub fn step(&mut self) -> Result<StepResult> {
        let t = self.time();
        self.interp.interpolate(self.forcing, t)?;

        let levels = self.state.levels();
        let (idx, idy) = self.forcing.inverse_spacing();
        let grid = StencilGrid {
            shape: self.state.shape(),
            sea: self.forcing.mask().flags(),
            idx,
            idy,
        };
        let (u, v) = (self.interp.u(), self.interp.v());
        let means = FallbackMeans::compute(&self.state, levels.cur(), u, v);

        let exchange = VerticalExchange;
        let mut source = CombinedReaction::new(Vec::with_capacity(2 + self.extra_sources.len()));
        source.add(&self.biology);
        source.add(&exchange);
        for extra in &self.extra_sources {
            source.add(extra.as_ref());
        }
        compute_reactions(
            &self.state,
            levels.cur(),
            u,
            v,
            &grid,
            &means,
            &source,
            self.config.vertical_coupling,
            &mut self.w,
            &mut self.reactions,
        );

        let two_dt = 2.0 * self.config.dt;
        for tracer in Tracer::ALL {
            let views = self.state.field_mut(tracer).levels_mut(levels);
            let update = FieldUpdate {
                tracer,
                grid,
                prev: views.prev,
                cur: views.cur,
                u,
                v,
                reactions: &self.reactions,
                means,
                diffusivity: self.config.diffusivity,
                two_dt,
            };
            update_field(&update, views.next);
        }

        for tracer in Tracer::ALL {
            self.state.clamp_min(tracer, self.config.floors.get(tracer));
        }

        let step = self.steps_done;
        self.steps_done += 1;
        let filtered = self.steps_done % self.config.navg == 0;
        if filtered {
            let sea = self.forcing.mask().flags();
            for tracer in Tracer::TRANSPORTED {
                mode_filter(self.state.field_mut(tracer).levels_mut(levels), sea);
            }
            debug!(step, "Applied computational-mode filter");
        }

        self.state.rotate();
        let result = StepResult {
            step,
            slot: self.state.levels().cur(),
            time: self.time(),
            filtered,
        };
        trace!(step, time = result.time, slot = %result.slot, "Leapfrog step complete");
        Ok(result)
    }

    /// Model time of the next step (s).
    #[inline]
    pub fn time(&self) -> f64 {
        self.t0 + self.steps_done as f64 * self.config.dt
    }

    /// Number of completed steps.
    #[inline]
    pub fn steps_done(&self) -> usize {
        self.steps_done
    }

    /// Model state.
    #[inline]
    pub fn state(&self) -> &NPZBState {
        &self.state
    }

    /// Consume the integrator and return the state.
    pub fn into_state(self) -> NPZBState {
        self.state
    }

    /// Configuration in use.
    #[inline]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Forcing in use.
    #[inline]
    pub fn forcing(&self) -> &'a F {
        self.forcing
    }

    /// Slot holding the newest level.
    #[inline]
    pub fn fresh_slot(&self) -> SlotIndex {
        self.state.levels().cur()
    }

    /// Velocity interpolated for the last step.
    pub fn velocity(&self) -> (&MaskedField, &MaskedField) {
        (self.interp.u(), self.interp.v())
    }

    /// Vertical velocity diagnosed in the last step (m/s).
    pub fn vertical_velocity(&self) -> &[f64] {
        &self.w
    }

    /// Reaction tendencies of the last step.
    pub fn reactions(&self) -> &[Tendencies] {
        &self.reactions
    }

    /// Maximum number of steps the forcing can support from the current time.
    pub fn remaining_steps(&self) -> usize {
        let span = self.forcing.forcing_end() - self.time();
        if span <= 0.0 {
            return 0;
        }
        // Step n runs at time() + n·dt, which must stay below the last sample
        (span / self.config.dt).ceil() as usize
    }

    /// Error that ended iteration, if any.
    pub fn stop_reason(&self) -> Option<&NpzbError> {
        self.stopped.as_ref()
    }
}

#[cfg(not(feature = "parallel"))]
fn update_field(update: &FieldUpdate<'_>, next: &mut [f64]) {
    crate::solver::rhs::leapfrog_update(update, next);
}

#[cfg(feature = "parallel")]
fn update_field(update: &FieldUpdate<'_>, next: &mut [f64]) {
    crate::solver::rhs::leapfrog_update_parallel(update, next);
}

impl<F: ForcingProvider + ?Sized> Iterator for LeapfrogIntegrator<'_, F> {
    type Item = StepResult;

    fn next(&mut self) -> Option<StepResult> {
        if self.stopped.is_some() {
            return None;
        }
        match self.step() {
            Ok(result) => Some(result),
            Err(err) => {
                debug!(steps = self.steps_done, reason = %err, "Integration stopped");
                self.stopped = Some(err);
                None
            }
        }
    }
}

impl<F: ForcingProvider + ?Sized> IntegratorInfo for LeapfrogIntegrator<'_, F> {
    fn name(&self) -> &'static str {
        "leapfrog"
    }

    fn order(&self) -> usize {
        2
    }

    fn n_levels(&self) -> usize {
        crate::types::N_SLOTS
    }

    fn dt(&self) -> f64 {
        self.config.dt
    }

    fn filter_interval(&self) -> Option<usize> {
        Some(self.config.navg)
    }
}
