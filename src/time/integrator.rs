//! Integrator metadata.
//!
//! A small dyn-compatible trait that lets the run driver and diagnostics
//! describe the scheme in use without knowing its concrete type.

/// Non-generic information about a time integrator.
pub trait IntegratorInfo {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Order of accuracy in time.
    fn order(&self) -> usize;

    /// Number of time levels kept in memory.
    fn n_levels(&self) -> usize;

    /// Time step (s).
    fn dt(&self) -> f64;

    /// Steps between computational-mode corrections, if any.
    fn filter_interval(&self) -> Option<usize> {
        None
    }
}
