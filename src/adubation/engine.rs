//! Adubation Engine
//!
//! Turns P and K fertility classes plus expected yield into per-cultivation
//! P₂O₅ and K₂O doses, with sulfur, molybdenum and cobalt supplements.
//!
//! Rules per class:
//! - Very Low / Low: full correction in cultivation 1, or 2/3 then 1/3 on
//!   weakly buffered soils; always plus maintenance
//! - Medium: partial correction in cultivation 1, maintenance after
//! - High: maintenance
//! - Very High: caller-selected strategy, plus optional starter

use crate::adubation::doses::*;
use crate::classification::{classify_k, classify_p};
use crate::config::RecommendationConfig;
use crate::diagnostic::DiagnosticReport;
use crate::error::{RecommendationError, Result};
use crate::types::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// K₂O in the sowing row is limited to avoid salt injury (kg/ha).
pub const ROW_K2O_CAP_KG_HA: f64 = 80.0;
/// Sulfur below this is supplemented (mg/dm³).
pub const S_SUPPLEMENT_THRESHOLD: f64 = 10.0;
pub const S_SUPPLEMENT_KG_HA: f64 = 20.0;
/// Seed-applied molybdenum on acid soils, kg/ha (35 g/ha).
pub const MO_KG_HA: f64 = 0.035;
/// Seed-applied cobalt, kg/ha (3 g/ha).
pub const CO_KG_HA: f64 = 0.003;

/// How a nutrient's dose was built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoseStrategy {
    CorrectionTotal,
    CorrectionGradual,
    CorrectionPartial,
    MaintenanceOnly,
    Replacement,
    NoApplication,
    ZeroThenMaintenance,
}

impl DoseStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            DoseStrategy::CorrectionTotal => "Total correction + maintenance",
            DoseStrategy::CorrectionGradual => "Gradual correction + maintenance",
            DoseStrategy::CorrectionPartial => "Partial correction + maintenance",
            DoseStrategy::MaintenanceOnly => "Maintenance",
            DoseStrategy::Replacement => "Replacement of exported nutrient",
            DoseStrategy::NoApplication => "No application",
            DoseStrategy::ZeroThenMaintenance => "None now, maintenance next cultivation",
        }
    }
}

/// Dose of one nutrient for one cultivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientDose {
    pub nutrient: Nutrient,
    pub class: FertilityClass,
    pub strategy: DoseStrategy,
    pub correction_kg_ha: f64,
    /// Maintenance or replacement part
    pub maintenance_kg_ha: f64,
    pub starter_kg_ha: f64,
    /// Rounded sum of the components
    pub total_kg_ha: f64,
}

/// Everything the engine needs for one cultivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdubationInput {
    pub p_class: FertilityClass,
    pub k_class: FertilityClass,
    pub yield_t_ha: f64,
    pub cultivation: Cultivation,
    pub clay_pct: Option<f64>,
    pub ctc: Option<f64>,
    pub s: Option<f64>,
    pub ph_water: Option<f64>,
    pub very_high_strategy: VeryHighStrategy,
    pub starter_p2o5_kg_ha: f64,
    pub starter_k2o_kg_ha: f64,
    pub rounding: RoundingMode,
}

fn validate_yield(yield_t_ha: f64) -> Result<f64> {
    if yield_t_ha.is_finite() && yield_t_ha > 0.0 {
        Ok(yield_t_ha)
    } else {
        Err(RecommendationError::invalid_input(
            "yield_t_ha",
            format!("expected yield must be > 0, got {}", yield_t_ha),
        ))
    }
}

impl AdubationInput {
    /// Build from a diagnostic report.
    ///
    /// The report keeps unmeasured P, K and S as `None`. For the dose math
    /// they count as 0.0, as in `from_sample`, so only a missing clay or
    /// CTC is an error.
    pub fn from_diagnostic(
        report: &DiagnosticReport,
        sample: &SoilSample,
        yield_t_ha: f64,
        config: &RecommendationConfig,
    ) -> Result<Self> {
        let p_class = match report.p_class() {
            Some(class) => class,
            None => {
                let (class, _) = classify_p(Some(sample.p.unwrap_or(0.0)), sample.clay_pct)
                    .ok_or_else(|| {
                        RecommendationError::invalid_input("clay_pct", "phosphorus class requires clay")
                    })?;
                class
            }
        };
        let k_class = match report.k_class() {
            Some(class) => class,
            None => {
                let (class, _) = classify_k(Some(sample.k.unwrap_or(0.0)), sample.ctc)
                    .ok_or_else(|| {
                        RecommendationError::invalid_input("ctc", "potassium class requires CTC")
                    })?;
                class
            }
        };

        Ok(Self {
            p_class,
            k_class,
            yield_t_ha: validate_yield(yield_t_ha)?,
            cultivation: Cultivation::from_number(config.cultivation_cycle)?,
            clay_pct: sample.clay_pct,
            ctc: sample.ctc,
            s: Some(sample.s.unwrap_or(0.0)),
            ph_water: sample.ph_water,
            very_high_strategy: config.very_high_strategy,
            starter_p2o5_kg_ha: config.starter_p2o5_kg_ha,
            starter_k2o_kg_ha: config.starter_k2o_kg_ha,
            rounding: config.rounding,
        })
    }

    /// Build straight from raw concentrations.
    ///
    /// Clay, CTC and pH are required. Unmeasured P, K and S count as 0.0,
    /// so they land in the lowest class and trigger the S supplement.
    pub fn from_sample(
        sample: &SoilSample,
        yield_t_ha: f64,
        config: &RecommendationConfig,
    ) -> Result<Self> {
        let clay = require(sample.clay_pct, "clay_pct")?;
        let ctc = require(sample.ctc, "ctc")?;
        let ph = require(sample.ph_water, "ph_water")?;

        let p = sample.p.unwrap_or(0.0);
        let k = sample.k.unwrap_or(0.0);
        let s = sample.s.unwrap_or(0.0);

        // Both classifiers are total once clay and CTC are present
        let (p_class, _) = classify_p(Some(p), Some(clay))
            .ok_or_else(|| RecommendationError::invalid_input("p", "unclassifiable"))?;
        let (k_class, _) = classify_k(Some(k), Some(ctc))
            .ok_or_else(|| RecommendationError::invalid_input("k", "unclassifiable"))?;

        Ok(Self {
            p_class,
            k_class,
            yield_t_ha: validate_yield(yield_t_ha)?,
            cultivation: Cultivation::from_number(config.cultivation_cycle)?,
            clay_pct: Some(clay),
            ctc: Some(ctc),
            s: Some(s),
            ph_water: Some(ph),
            very_high_strategy: config.very_high_strategy,
            starter_p2o5_kg_ha: config.starter_p2o5_kg_ha,
            starter_k2o_kg_ha: config.starter_k2o_kg_ha,
            rounding: config.rounding,
        })
    }

    fn starter(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::P2O5 => self.starter_p2o5_kg_ha,
            Nutrient::K2O => self.starter_k2o_kg_ha,
        }
    }
}

/// Recommendation for one cultivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdubationRecommendation {
    pub cultivation: Cultivation,
    pub yield_t_ha: f64,
    pub p2o5: NutrientDose,
    pub k2o: NutrientDose,
    pub k2o_row_kg_ha: f64,
    pub k2o_broadcast_kg_ha: f64,
    pub maintenance_p2o5_kg_ha: f64,
    pub maintenance_k2o_kg_ha: f64,
    pub replacement_p2o5_kg_ha: f64,
    pub replacement_k2o_kg_ha: f64,
    pub s_kg_ha: f64,
    /// kg/ha; shown as g/ha
    pub mo_kg_ha: f64,
    /// kg/ha; shown as g/ha
    pub co_kg_ha: f64,
    pub observations: Vec<String>,
}

impl AdubationRecommendation {
    /// Human-readable summary lines.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "P2O5: {:.0} kg/ha ({})",
                self.p2o5.total_kg_ha,
                self.p2o5.strategy.label()
            ),
            format!(
                "K2O: {:.0} kg/ha ({}); row {:.0}, broadcast {:.0}",
                self.k2o.total_kg_ha,
                self.k2o.strategy.label(),
                self.k2o_row_kg_ha,
                self.k2o_broadcast_kg_ha
            ),
        ];
        if self.s_kg_ha > 0.0 {
            lines.push(format!("S-SO4: {:.0} kg/ha", self.s_kg_ha));
        }
        if self.mo_kg_ha > 0.0 {
            lines.push(format!("Mo: {} (seed)", fmt_g_ha(self.mo_kg_ha)));
        }
        lines.push(format!("Co: {} (seed)", fmt_g_ha(self.co_kg_ha)));
        lines
    }
}

/// Cultivation 1 and 2 of the same correction program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyclePlan {
    pub first: AdubationRecommendation,
    pub second: AdubationRecommendation,
}

// ============================================================================
// Engine
// ============================================================================

fn nutrient_dose(nutrient: Nutrient, class: FertilityClass, input: &AdubationInput) -> NutrientDose {
    let maintenance = maintenance_dose(nutrient, input.yield_t_ha);
    let replacement = replacement_dose(nutrient, input.yield_t_ha);
    let correction = correction_dose(nutrient, class);
    let first = input.cultivation == Cultivation::First;

    let (strategy, correction_part, maintenance_part) = match class {
        FertilityClass::VeryLow | FertilityClass::Low => {
            if gradual_eligible(class, input.clay_pct, input.ctc) {
                let share = if first { GRADUAL_FIRST_SHARE } else { GRADUAL_SECOND_SHARE };
                debug!(nutrient = nutrient.label(), share, "Gradual correction");
                (DoseStrategy::CorrectionGradual, correction * share, maintenance)
            } else if first {
                (DoseStrategy::CorrectionTotal, correction, maintenance)
            } else {
                (DoseStrategy::MaintenanceOnly, 0.0, maintenance)
            }
        }
        FertilityClass::Medium => {
            if first {
                (DoseStrategy::CorrectionPartial, correction, maintenance)
            } else {
                (DoseStrategy::MaintenanceOnly, 0.0, maintenance)
            }
        }
        FertilityClass::High => (DoseStrategy::MaintenanceOnly, 0.0, maintenance),
        FertilityClass::VeryHigh => match input.very_high_strategy {
            VeryHighStrategy::Replace => (DoseStrategy::Replacement, 0.0, replacement),
            VeryHighStrategy::ZeroAndZero => (DoseStrategy::NoApplication, 0.0, 0.0),
            VeryHighStrategy::ZeroThenMaintenance => {
                let later = if first { 0.0 } else { maintenance.min(replacement) };
                (DoseStrategy::ZeroThenMaintenance, 0.0, later)
            }
        },
    };

    let starter = if class == FertilityClass::VeryHigh {
        input.starter(nutrient).max(0.0)
    } else {
        0.0
    };

    NutrientDose {
        nutrient,
        class,
        strategy,
        correction_kg_ha: correction_part,
        maintenance_kg_ha: maintenance_part,
        starter_kg_ha: starter,
        total_kg_ha: input.rounding.apply(correction_part + maintenance_part + starter),
    }
}

/// Split rounded K₂O between the row (capped) and broadcast.
pub fn split_k2o_row(total_kg_ha: f64) -> (f64, f64) {
    let row = total_kg_ha.min(ROW_K2O_CAP_KG_HA);
    (row, total_kg_ha - row)
}

/// P₂O₅, K₂O and supplements for the input's cultivation.
pub fn recommend(input: &AdubationInput) -> Result<AdubationRecommendation> {
    validate_yield(input.yield_t_ha)?;

    let p2o5 = nutrient_dose(Nutrient::P2O5, input.p_class, input);
    let k2o = nutrient_dose(Nutrient::K2O, input.k_class, input);
    let (row, broadcast) = split_k2o_row(k2o.total_kg_ha);

    let s_kg_ha = match input.s {
        Some(s) if s < S_SUPPLEMENT_THRESHOLD => S_SUPPLEMENT_KG_HA,
        _ => 0.0,
    };
    let mo_kg_ha = match input.ph_water {
        Some(ph) if ph < 5.5 => MO_KG_HA,
        _ => 0.0,
    };

    let mut observations = Vec::new();
    if matches!(input.clay_pct, Some(c) if c < 20.0) {
        observations.push("Sandy soil: split P and K applications".to_string());
    }
    if matches!(input.ctc, Some(c) if c < 7.5) {
        observations.push("Low CTC: watch potassium splitting".to_string());
    }
    if broadcast > 0.0 {
        observations.push(format!(
            "K2O above {:.0} kg/ha goes broadcast before sowing or as topdressing",
            ROW_K2O_CAP_KG_HA
        ));
    }
    if input.s.is_none() {
        observations.push("Sulfur not measured: no S supplement computed".to_string());
    }

    debug!(
        cycle = input.cultivation.number(),
        p2o5 = p2o5.total_kg_ha,
        k2o = k2o.total_kg_ha,
        "Adubation computed"
    );

    Ok(AdubationRecommendation {
        cultivation: input.cultivation,
        yield_t_ha: input.yield_t_ha,
        maintenance_p2o5_kg_ha: maintenance_dose(Nutrient::P2O5, input.yield_t_ha),
        maintenance_k2o_kg_ha: maintenance_dose(Nutrient::K2O, input.yield_t_ha),
        replacement_p2o5_kg_ha: replacement_dose(Nutrient::P2O5, input.yield_t_ha),
        replacement_k2o_kg_ha: replacement_dose(Nutrient::K2O, input.yield_t_ha),
        p2o5,
        k2o,
        k2o_row_kg_ha: row,
        k2o_broadcast_kg_ha: broadcast,
        s_kg_ha,
        mo_kg_ha,
        co_kg_ha: CO_KG_HA,
        observations,
    })
}

/// Both cultivations of the program, ignoring the input's own cycle.
pub fn plan_both_cycles(input: &AdubationInput) -> Result<CyclePlan> {
    let first = recommend(&AdubationInput { cultivation: Cultivation::First, ..input.clone() })?;
    let second = recommend(&AdubationInput { cultivation: Cultivation::Second, ..input.clone() })?;
    Ok(CyclePlan { first, second })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn input(p_class: FertilityClass, k_class: FertilityClass) -> AdubationInput {
        AdubationInput {
            p_class,
            k_class,
            yield_t_ha: 3.6,
            cultivation: Cultivation::First,
            clay_pct: Some(45.0),
            ctc: Some(12.0),
            s: Some(12.0),
            ph_water: Some(5.8),
            very_high_strategy: VeryHighStrategy::Replace,
            starter_p2o5_kg_ha: 0.0,
            starter_k2o_kg_ha: 0.0,
            rounding: RoundingMode::OneDecimal,
        }
    }

    #[test]
    fn test_gradual_first_cycle_before_rounding() {
        let sandy = AdubationInput {
            clay_pct: Some(13.0),
            ctc: Some(2.5),
            ..input(FertilityClass::VeryLow, FertilityClass::High)
        };
        let rec = recommend(&sandy).unwrap();
        assert_eq!(rec.p2o5.strategy, DoseStrategy::CorrectionGradual);
        assert_relative_eq!(rec.p2o5.correction_kg_ha, 106.666_666_666, epsilon = 1e-6);
        assert_relative_eq!(rec.p2o5.maintenance_kg_ha, 54.0, epsilon = 1e-9);
        assert_relative_eq!(rec.p2o5.total_kg_ha, 160.7, epsilon = 1e-9);

        let nearest_five = AdubationInput { rounding: RoundingMode::NearestFive, ..sandy };
        let rec = recommend(&nearest_five).unwrap();
        assert_relative_eq!(rec.p2o5.total_kg_ha, 160.0);
    }

    #[test]
    fn test_gradual_second_cycle() {
        let sandy = AdubationInput {
            clay_pct: Some(13.0),
            cultivation: Cultivation::Second,
            ..input(FertilityClass::VeryLow, FertilityClass::Low)
        };
        let rec = recommend(&sandy).unwrap();
        assert_relative_eq!(rec.p2o5.correction_kg_ha, 160.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(rec.k2o.correction_kg_ha, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_total_correction_on_buffered_soil() {
        let rec = recommend(&input(FertilityClass::Low, FertilityClass::VeryLow)).unwrap();
        assert_eq!(rec.p2o5.strategy, DoseStrategy::CorrectionTotal);
        assert_relative_eq!(rec.p2o5.total_kg_ha, 134.0, epsilon = 1e-9);
        assert_relative_eq!(rec.k2o.total_kg_ha, 210.0, epsilon = 1e-9);

        let second = AdubationInput {
            cultivation: Cultivation::Second,
            ..input(FertilityClass::Low, FertilityClass::VeryLow)
        };
        let rec = recommend(&second).unwrap();
        assert_eq!(rec.p2o5.strategy, DoseStrategy::MaintenanceOnly);
        assert_relative_eq!(rec.p2o5.total_kg_ha, 54.0, epsilon = 1e-9);
    }

    #[test]
    fn test_medium_and_high() {
        let rec = recommend(&input(FertilityClass::Medium, FertilityClass::High)).unwrap();
        assert_eq!(rec.p2o5.strategy, DoseStrategy::CorrectionPartial);
        assert_relative_eq!(rec.p2o5.total_kg_ha, 94.0, epsilon = 1e-9);
        assert_eq!(rec.k2o.strategy, DoseStrategy::MaintenanceOnly);
        assert_relative_eq!(rec.k2o.total_kg_ha, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_very_high_strategies() {
        let base = input(FertilityClass::VeryHigh, FertilityClass::VeryHigh);

        let rec = recommend(&base).unwrap();
        assert_eq!(rec.p2o5.strategy, DoseStrategy::Replacement);
        assert_relative_eq!(rec.p2o5.total_kg_ha, 50.4, epsilon = 1e-9);
        assert_relative_eq!(rec.k2o.total_kg_ha, 72.0, epsilon = 1e-9);

        let zero = AdubationInput { very_high_strategy: VeryHighStrategy::ZeroAndZero, ..base.clone() };
        let plan = plan_both_cycles(&zero).unwrap();
        assert_relative_eq!(plan.first.p2o5.total_kg_ha, 0.0);
        assert_relative_eq!(plan.second.k2o.total_kg_ha, 0.0);

        let later = AdubationInput {
            very_high_strategy: VeryHighStrategy::ZeroThenMaintenance,
            starter_p2o5_kg_ha: 20.0,
            ..base
        };
        let plan = plan_both_cycles(&later).unwrap();
        assert_relative_eq!(plan.first.p2o5.total_kg_ha, 20.0);
        // min(maintenance 54, replacement 50.4) + starter 20
        assert_relative_eq!(plan.second.p2o5.total_kg_ha, 70.4, epsilon = 1e-9);
        assert_relative_eq!(plan.second.k2o.total_kg_ha, 72.0, epsilon = 1e-9);
    }

    #[test]
    fn test_k_row_cap() {
        let (row, broadcast) = split_k2o_row(155.0);
        assert_relative_eq!(row, 80.0);
        assert_relative_eq!(broadcast, 75.0);

        for total in [0.0, 35.0, 80.0, 90.0, 210.0] {
            let (row, broadcast) = split_k2o_row(total);
            assert!(row <= ROW_K2O_CAP_KG_HA);
            assert_eq!(row + broadcast, total);
        }
    }

    #[test]
    fn test_supplements() {
        let acid_low_s = AdubationInput {
            s: Some(2.8),
            ph_water: Some(4.7),
            ..input(FertilityClass::High, FertilityClass::High)
        };
        let rec = recommend(&acid_low_s).unwrap();
        assert_relative_eq!(rec.s_kg_ha, 20.0);
        assert_relative_eq!(rec.mo_kg_ha, 0.035);
        assert_relative_eq!(rec.co_kg_ha, 0.003);
        assert!(rec.summary_lines().iter().any(|l| l == "Mo: 35 g/ha (seed)"));

        let rec = recommend(&input(FertilityClass::High, FertilityClass::High)).unwrap();
        assert_relative_eq!(rec.s_kg_ha, 0.0);
        assert_relative_eq!(rec.mo_kg_ha, 0.0);
    }

    #[test]
    fn test_from_sample_defaults_missing_nutrients_to_zero() {
        let sample = SoilSample {
            clay_pct: Some(45.0),
            ctc: Some(12.0),
            ph_water: Some(5.8),
            ..Default::default()
        };
        let input = AdubationInput::from_sample(&sample, 3.6, &RecommendationConfig::default()).unwrap();
        assert_eq!(input.p_class, FertilityClass::VeryLow);
        assert_eq!(input.k_class, FertilityClass::VeryLow);
        assert_eq!(input.s, Some(0.0));

        let rec = recommend(&input).unwrap();
        assert_relative_eq!(rec.s_kg_ha, 20.0);
    }

    #[test]
    fn test_from_sample_requires_clay_ctc_ph() {
        let sample = SoilSample { ctc: Some(12.0), ph_water: Some(5.8), ..Default::default() };
        let err = AdubationInput::from_sample(&sample, 3.6, &RecommendationConfig::default())
            .unwrap_err();
        assert!(matches!(err, RecommendationError::InvalidInput { ref field, .. } if field == "clay_pct"));
    }

    #[test]
    fn test_from_diagnostic_counts_unmeasured_as_zero() {
        let sample = SoilSample {
            ph_water: Some(5.8),
            clay_pct: Some(45.0),
            ctc: Some(12.0),
            k: Some(100.0),
            ..Default::default()
        };
        let config = RecommendationConfig::default();
        let report = crate::diagnostic::diagnose(&sample);
        assert_eq!(report.p_class(), None);

        let input = AdubationInput::from_diagnostic(&report, &sample, 3.6, &config).unwrap();
        assert_eq!(input.p_class, FertilityClass::VeryLow);
        assert_eq!(input.s, Some(0.0));

        let from_sample = AdubationInput::from_sample(&sample, 3.6, &config).unwrap();
        let rec = recommend(&input).unwrap();
        assert_relative_eq!(rec.s_kg_ha, 20.0);
        assert_eq!(rec, recommend(&from_sample).unwrap());
    }

    #[test]
    fn test_from_diagnostic_requires_clay() {
        let sample = SoilSample { ph_water: Some(5.8), ctc: Some(12.0), p: Some(10.0), ..Default::default() };
        let report = crate::diagnostic::diagnose(&sample);
        let err = AdubationInput::from_diagnostic(&report, &sample, 3.6, &RecommendationConfig::default())
            .unwrap_err();
        assert!(matches!(err, RecommendationError::InvalidInput { ref field, .. } if field == "clay_pct"));
    }

    #[test]
    fn test_invalid_yield() {
        let bad = AdubationInput { yield_t_ha: 0.0, ..input(FertilityClass::High, FertilityClass::High) };
        assert!(recommend(&bad).is_err());
    }
}
