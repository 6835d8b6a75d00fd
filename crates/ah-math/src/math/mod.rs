//! Core math modules.

pub mod percentile;
pub mod summary;
