//! Adubation engine: P₂O₅/K₂O correction, maintenance and supplements

pub mod doses;
pub mod engine;

pub use doses::{correction_dose, maintenance_dose, replacement_dose, Nutrient};
pub use engine::{
    plan_both_cycles, recommend, split_k2o_row, AdubationInput, AdubationRecommendation,
    CyclePlan, DoseStrategy, NutrientDose, ROW_K2O_CAP_KG_HA,
};
