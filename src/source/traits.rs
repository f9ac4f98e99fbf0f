//! Local reaction source interface.
//!
//! A reaction source maps the local state of one cell to tendencies of the
//! four variables (per second). Sources are evaluated independently per
//! cell and summed, so they must be `Send + Sync` for the parallel row
//! update.

use std::ops::Add;

use crate::solver::Tracer;

/// Local state seen by a reaction source at one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReactionContext {
    /// Nutrient
    pub n: f64,
    /// Phytoplankton
    pub p: f64,
    /// Zooplankton
    pub z: f64,
    /// Benthos
    pub b: f64,
    /// Vertical velocity (m/s, positive upward)
    pub w: f64,
}

impl ReactionContext {
    /// Create a context.
    pub fn new(n: f64, p: f64, z: f64, b: f64, w: f64) -> Self {
        Self { n, p, z, b, w }
    }
}

/// Rates of change of N, P, Z and B (concentration per second).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tendencies {
    pub n: f64,
    pub p: f64,
    pub z: f64,
    pub b: f64,
}

impl Tendencies {
    /// Zero tendencies.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Tendency of one variable.
    #[inline]
    pub fn of(&self, tracer: Tracer) -> f64 {
        match tracer {
            Tracer::N => self.n,
            Tracer::P => self.p,
            Tracer::Z => self.z,
            Tracer::B => self.b,
        }
    }

    /// Sum over the four variables. Zero for a mass-conserving source.
    pub fn total(&self) -> f64 {
        self.n + self.p + self.z + self.b
    }
}

impl Add for Tendencies {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            n: self.n + other.n,
            p: self.p + other.p,
            z: self.z + other.z,
            b: self.b + other.b,
        }
    }
}

/// A local (cell-wise) reaction term.
pub trait ReactionSource: Send + Sync {
    /// Tendencies at one cell.
    fn evaluate(&self, ctx: &ReactionContext) -> Tendencies;

    /// Name of this source for logging.
    fn name(&self) -> &'static str;
}

/// Sum of several reaction sources.
pub struct CombinedReaction<'a> {
    sources: Vec<&'a dyn ReactionSource>,
}

impl<'a> CombinedReaction<'a> {
    /// Create a combined source from a list of sources.
    pub fn new(sources: Vec<&'a dyn ReactionSource>) -> Self {
        Self { sources }
    }

    /// Add a source to the combination.
    pub fn add(&mut self, source: &'a dyn ReactionSource) {
        self.sources.push(source);
    }

    /// Number of combined sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether no source has been added.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl ReactionSource for CombinedReaction<'_> {
    fn evaluate(&self, ctx: &ReactionContext) -> Tendencies {
        self.sources
            .iter()
            .fold(Tendencies::zero(), |acc, s| acc + s.evaluate(ctx))
    }

    fn name(&self) -> &'static str {
        "combined"
    }
}
