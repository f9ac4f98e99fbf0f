//! Structured-grid masking.
//!
//! - [`SeaMask`]: fixed land/sea classification shared by forcing and state
//! - [`MaskedField`]: 2D values with explicit per-cell validity

mod land_mask;
mod masked_field;

pub use land_mask::{SeaMask, SeaMaskStatistics};
pub use masked_field::{FILL_VALUE_F64, MaskedField, VELOCITY_SENTINEL, is_valid_f64};
