//! Liming calculator: SMP, V% and polynomial methods

pub mod methods;
pub mod recommendation;
pub mod smp_table;

pub use methods::{
    adjust_for_prnt, cap_surface, lime_dose_from_polynomial, lime_dose_from_v, LimingMethod,
    SURFACE_CAP_T_HA, SURFACE_FRACTION,
};
pub use recommendation::{
    method_estimates, recommend_lime, ApplicationMode, LimeMaterial, LimingOptions,
    LimingRecommendation, MethodEstimate,
};
pub use smp_table::lime_dose_from_smp;
