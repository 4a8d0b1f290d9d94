//! Soybean Soil-Correction and Fertilization Recommender
//!
//! Liming and fertilizer recommendations for soybean from Mehlich-1 soil
//! analysis, following the CQFS-RS/SC (2016) tables.
//!
//! Module structure, leaves first:
//! - `classification/`: interpretation tables and classifiers
//! - `diagnostic/`: per-sample classes, response probability, alerts
//! - `liming/`: SMP, V% and polynomial lime doses and application mode
//! - `adubation/`: P₂O₅/K₂O correction and maintenance, S/Mo/Co supplements
//! - `blend/`: fertilizer catalog and product allocation
//! - `recommender`: composes the stages per parcel, in parallel for batches
//!
//! All computations are pure functions over per-call inputs.

pub mod adubation;
pub mod blend;
pub mod classification;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod liming;
pub mod recommender;
pub mod types;

// Re-export commonly used types
pub use adubation::{AdubationInput, AdubationRecommendation, CyclePlan};
pub use blend::{BlendResult, BlendStrategy, NutrientDemand};
pub use config::RecommendationConfig;
pub use diagnostic::{diagnose, DiagnosticReport};
pub use error::{RecommendationError, Result};
pub use liming::{LimingOptions, LimingRecommendation};
pub use recommender::{FullRecommendation, ParcelRequest, Recommender};
pub use types::*;
