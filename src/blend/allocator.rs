//! Fertilizer Blend Allocator
//!
//! Converts nutrient demand (kg/ha) into product doses (kg/ha) under one of
//! three strategies:
//! - Formulated: one N-P-K formula, complemented with TSP/KCl
//! - User choice: one phosphate and one potassic source picked by the user
//! - Software choice: sources picked automatically, covering S when needed
//!
//! S is always topped up with gypsum and Mo with sodium molybdate.
//! Demand that no selected product can supply is reported in `unmet`.

use crate::adubation::AdubationRecommendation;
use crate::blend::catalog::*;
use crate::error::Result;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

/// Quantities at or below this are treated as zero (kg/ha).
pub const EPSILON: f64 = 1e-6;

/// Bag size used for purchase quantities (kg).
pub const SACK_KG: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendNutrient {
    P2O5,
    K2O,
    S,
    Mo,
}

/// Nutrient demand to be met, kg/ha
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientDemand {
    pub p2o5: f64,
    pub k2o: f64,
    pub s: f64,
    pub mo: f64,
}

impl NutrientDemand {
    pub fn from_recommendation(rec: &AdubationRecommendation) -> Self {
        Self {
            p2o5: rec.p2o5.total_kg_ha,
            k2o: rec.k2o.total_kg_ha,
            s: rec.s_kg_ha,
            mo: rec.mo_kg_ha,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDose {
    pub product: String,
    pub dose_kg_ha: f64,
}

impl ProductDose {
    /// 50 kg sacks needed for an area.
    pub fn sacks(&self, area_ha: f64) -> f64 {
        self.dose_kg_ha * area_ha / SACK_KG
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendResult {
    pub products: SmallVec<[ProductDose; 4]>,
    pub messages: Vec<String>,
    pub unmet: FxHashMap<BlendNutrient, f64>,
}

impl BlendResult {
    fn add(&mut self, product: &FertilizerProduct, dose_kg_ha: f64) {
        if dose_kg_ha > EPSILON {
            self.products.push(ProductDose {
                product: product.name.to_string(),
                dose_kg_ha,
            });
        }
    }

    fn add_named(&mut self, name: &str, dose_kg_ha: f64) {
        if dose_kg_ha > EPSILON {
            self.products.push(ProductDose {
                product: name.to_string(),
                dose_kg_ha,
            });
        }
    }

    fn record_unmet(&mut self, nutrient: BlendNutrient, quantity: f64) {
        warn!(?nutrient, quantity, "Nutrient demand not covered by selected products");
        *self.unmet.entry(nutrient).or_insert(0.0) += quantity;
    }

    pub fn dose_of(&self, product_name: &str) -> Option<f64> {
        self.products
            .iter()
            .find(|p| p.product == product_name)
            .map(|p| p.dose_kg_ha)
    }
}

/// Strategy selected by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum BlendStrategy {
    Formulated { grade: String, name: Option<String> },
    UserChoice { phosphate: Option<String>, potassic: Option<String> },
    SoftwareChoice,
}

impl Default for BlendStrategy {
    fn default() -> Self {
        BlendStrategy::SoftwareChoice
    }
}

/// Dispatch on the strategy.
pub fn allocate(demand: &NutrientDemand, strategy: &BlendStrategy) -> Result<BlendResult> {
    match strategy {
        BlendStrategy::Formulated { grade, name } => {
            let grade = FormulaGrade::parse(grade)?;
            let label = name.clone().unwrap_or_else(|| format!("Formula {}", grade));
            formulated(demand, &grade, &label)
        }
        BlendStrategy::UserChoice { phosphate, potassic } => {
            individual_user_choice(demand, phosphate.as_deref(), potassic.as_deref())
        }
        BlendStrategy::SoftwareChoice => individual_software_choice(demand),
    }
}

// ============================================================================
// Supplements
// ============================================================================

fn top_up_supplements(result: &mut BlendResult, s_remaining: f64, mo: f64) {
    if s_remaining > EPSILON {
        result.add(&GYPSUM, s_remaining / GYPSUM.s);
    }
    if mo > EPSILON {
        result.add(&SODIUM_MOLYBDATE, mo / SODIUM_MOLYBDATE.mo);
        result
            .messages
            .push("Sodium molybdate can be applied with the seed treatment".to_string());
    }
}

fn nitrogen_advisory(n_kg_ha: f64, source: &str) -> String {
    format!(
        "{} supplies {:.1} kg/ha of N; soybean relies on biological fixation, so no extra N is needed",
        source, n_kg_ha
    )
}

// ============================================================================
// Formulated
// ============================================================================

/// One formula dosed by the nutrient that needs the most product, then
/// complemented with TSP and KCl for any nutrient the formula lacks.
pub fn formulated(demand: &NutrientDemand, grade: &FormulaGrade, name: &str) -> Result<BlendResult> {
    let mut result = BlendResult::default();
    let p_frac = grade.p2o5 / 100.0;
    let k_frac = grade.k2o / 100.0;

    let mass_for = |need: f64, frac: f64| if need > EPSILON && frac > 0.0 { need / frac } else { 0.0 };
    let mass = mass_for(demand.p2o5, p_frac).max(mass_for(demand.k2o, k_frac));
    result.add_named(name, mass);

    let p_remaining = demand.p2o5 - mass * p_frac;
    let k_remaining = demand.k2o - mass * k_frac;

    if p_remaining > EPSILON {
        result.add(&TSP, p_remaining / TSP.p2o5);
    }
    if k_remaining > EPSILON {
        result.add(&KCL, k_remaining / KCL.k2o);
    }

    for (surplus, nutrient) in [(-p_remaining, "P2O5"), (-k_remaining, "K2O")] {
        if surplus > 0.5 {
            result.messages.push(format!(
                "Formula {} supplies {:.1} kg/ha {} above the recommendation",
                grade, surplus, nutrient
            ));
        }
    }
    if grade.n > 0.0 && mass > EPSILON {
        result.messages.push(nitrogen_advisory(mass * grade.n / 100.0, name));
    }

    top_up_supplements(&mut result, demand.s, demand.mo);
    debug!(formula = %grade, mass, "Formulated blend computed");
    Ok(result)
}

// ============================================================================
// Individual sources
// ============================================================================

fn allocate_individual(
    demand: &NutrientDemand,
    phosphate: Option<&'static FertilizerProduct>,
    potassic: Option<&'static FertilizerProduct>,
) -> BlendResult {
    let mut result = BlendResult::default();
    let mut s_supplied = 0.0;

    if demand.p2o5 > EPSILON {
        match phosphate {
            Some(product) if product.p2o5 > 0.0 => {
                let dose = demand.p2o5 / product.p2o5;
                result.add(product, dose);
                s_supplied += dose * product.s;
                if product.n > 0.0 {
                    result.messages.push(nitrogen_advisory(dose * product.n, product.name));
                }
            }
            Some(product) => {
                result.messages.push(format!("'{}' does not supply P2O5", product.name));
                result.record_unmet(BlendNutrient::P2O5, demand.p2o5);
            }
            None => {
                result.messages.push(format!(
                    "Select a phosphate source to supply {:.1} kg/ha of P2O5",
                    demand.p2o5
                ));
                result.record_unmet(BlendNutrient::P2O5, demand.p2o5);
            }
        }
    } else if let Some(product) = phosphate {
        result.messages.push(format!(
            "No P2O5 need identified; '{}' not applied",
            product.name
        ));
    }

    if demand.k2o > EPSILON {
        match potassic {
            Some(product) if product.k2o > 0.0 => {
                let dose = demand.k2o / product.k2o;
                result.add(product, dose);
                s_supplied += dose * product.s;
            }
            Some(product) => {
                result.messages.push(format!("'{}' does not supply K2O", product.name));
                result.record_unmet(BlendNutrient::K2O, demand.k2o);
            }
            None => {
                result.messages.push(format!(
                    "Select a potassium source to supply {:.1} kg/ha of K2O",
                    demand.k2o
                ));
                result.record_unmet(BlendNutrient::K2O, demand.k2o);
            }
        }
    } else if let Some(product) = potassic {
        result.messages.push(format!(
            "No K2O need identified; '{}' not applied",
            product.name
        ));
    }

    if demand.s > EPSILON && s_supplied > EPSILON {
        result.messages.push(format!(
            "{:.1} kg/ha of S already supplied by the selected sources",
            s_supplied.min(demand.s)
        ));
    }

    top_up_supplements(&mut result, demand.s - s_supplied, demand.mo);
    result
}

/// Sources picked by the user, by code or name. `None` means no selection.
pub fn individual_user_choice(
    demand: &NutrientDemand,
    phosphate: Option<&str>,
    potassic: Option<&str>,
) -> Result<BlendResult> {
    let phosphate = phosphate.map(|code| resolve_source(code, find_phosphate)).transpose()?;
    let potassic = potassic.map(|code| resolve_source(code, find_potassic)).transpose()?;
    Ok(allocate_individual(demand, phosphate, potassic))
}

/// Look a source up among products of the expected kind. A known product of
/// another kind is still returned, and its missing nutrient ends up unmet.
fn resolve_source(
    code: &str,
    find_kind: fn(&str) -> Option<&'static FertilizerProduct>,
) -> Result<&'static FertilizerProduct> {
    match find_kind(code) {
        Some(product) => Ok(product),
        None => {
            let product = resolve_product(code)?;
            debug!(product = product.code, kind = ?product.kind, "Source outside the expected kind");
            Ok(product)
        }
    }
}

/// Highest-grade nitrogen-free sources; sulfur-bearing ones when S is needed.
pub fn individual_software_choice(demand: &NutrientDemand) -> Result<BlendResult> {
    let s_needed = demand.s > EPSILON;

    let phosphate = if demand.p2o5 > EPSILON {
        if s_needed && demand.k2o <= EPSILON {
            Some(&SSP)
        } else {
            Some(&TSP)
        }
    } else {
        None
    };
    let potassic = if demand.k2o > EPSILON {
        if s_needed {
            Some(&K2SO4)
        } else {
            Some(&KCL)
        }
    } else {
        None
    };

    let mut result = allocate_individual(demand, phosphate, potassic);
    let chosen: Vec<&str> = [phosphate, potassic].into_iter().flatten().map(|p| p.code).collect();
    if !chosen.is_empty() {
        result
            .messages
            .insert(0, format!("Sources selected automatically: {}", chosen.join(", ")));
    }
    Ok(result)
}
