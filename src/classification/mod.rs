//! Soil-analysis classification tables and classifiers

pub mod classify;
pub mod lookup_tables;

pub use classify::*;
pub use lookup_tables::{critical_level, k_bins, p_bins, FertilityBin};
