//! Model state: the N, P, Z and B fields on a masked grid.
//!
//! - [`ScalarField`]: three time-level buffers for one variable
//! - [`TimeLevels`]: which buffer is previous, current and next
//! - [`NPZBState`]: the four fields, their shared mask and the level triple

mod field;
mod npzb;
mod time_levels;

pub use field::{LevelsMut, ScalarField};
pub use npzb::{GradientSpec, NPZBState, Tracer};
pub(crate) use npzb::masked_mean;
pub use time_levels::TimeLevels;
