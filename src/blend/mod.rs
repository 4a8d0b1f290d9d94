//! Fertilizer catalog and blend allocation

pub mod allocator;
pub mod catalog;

pub use allocator::{
    allocate, formulated, individual_software_choice, individual_user_choice, BlendNutrient,
    BlendResult, BlendStrategy, NutrientDemand, ProductDose,
};
pub use catalog::{find_phosphate, find_potassic, find_product, FertilizerProduct, FormulaGrade};
