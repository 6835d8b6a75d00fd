//! Alarm health statistics utilities.

pub mod math;

pub use math::percentile::*;
pub use math::summary::*;
