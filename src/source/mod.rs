//! Local reaction terms of the ecosystem model.
//!
//! - [`traits`]: the [`ReactionSource`] interface and [`CombinedReaction`]
//! - [`biology`]: uptake, mortality, grazing and benthic export
//! - [`vertical`]: diagnosed upwelling and the N–B exchange it drives

pub mod biology;
pub mod traits;
pub mod vertical;

pub use biology::{
    BiologyRates, NPZBiology, ReactionTerms, ivlev_grazing, michaelis_menten_uptake,
};
pub use traits::{CombinedReaction, ReactionContext, ReactionSource, Tendencies};
pub use vertical::{VERTICAL_DAMPING, VerticalExchange, vertical_velocity};
