//! Diagnostic Report
//!
//! Aggregates every classifier and alert check for one soil sample into a
//! single report. This report is the only upstream input the adubation
//! engine needs.

use crate::classification::*;
use crate::diagnostic::alerts::{collect_alerts, AlertCard};
use crate::types::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// P or K interpretation with the contextual class that selected its table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroInterpretation {
    pub value: f64,
    pub class: FertilityClass,
    pub class_index: u8,
    pub probability_of_response: ResponseProbability,
    /// Upper bound of Medium in the table that was used.
    pub critical_level: f64,
}

impl MacroInterpretation {
    fn new(value: f64, class: FertilityClass, bins: &[FertilityBin]) -> Self {
        Self {
            value,
            class,
            class_index: class.index(),
            probability_of_response: prob_response(class),
            critical_level: critical_level(bins).unwrap_or(f64::NAN),
        }
    }
}

/// Full interpretation of one soil sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub texture_class: Option<TextureClass>,
    pub ctc_class: Option<CtcClass>,
    pub organic_matter: Option<NutrientLevel>,
    pub phosphorus: Option<MacroInterpretation>,
    pub potassium: Option<MacroInterpretation>,
    pub calcium: Option<NutrientLevel>,
    pub magnesium: Option<NutrientLevel>,
    pub sulfur: Option<NutrientLevel>,
    pub sulfur_adequate_for_soy: Option<bool>,
    pub zinc: Option<NutrientLevel>,
    pub copper: Option<NutrientLevel>,
    pub boron: Option<NutrientLevel>,
    pub manganese: Option<NutrientLevel>,
    pub alerts: Vec<AlertCard>,
    pub notes: Vec<String>,
}

impl DiagnosticReport {
    pub fn p_class(&self) -> Option<FertilityClass> {
        self.phosphorus.as_ref().map(|p| p.class)
    }

    pub fn k_class(&self) -> Option<FertilityClass> {
        self.potassium.as_ref().map(|k| k.class)
    }
}

/// Classify every measured attribute of a sample.
pub fn diagnose(sample: &SoilSample) -> DiagnosticReport {
    let texture_class = classify_clay(sample.clay_pct);
    let ctc_class = classify_ctc(sample.ctc);

    let phosphorus = match (sample.p, classify_p(sample.p, sample.clay_pct)) {
        (Some(value), Some((class, texture))) => {
            Some(MacroInterpretation::new(value, class, p_bins(texture)))
        }
        _ => None,
    };
    let potassium = match (sample.k, classify_k(sample.k, sample.ctc)) {
        (Some(value), Some((class, ctc))) => {
            Some(MacroInterpretation::new(value, class, k_bins(ctc)))
        }
        _ => None,
    };

    debug!(
        p_class = ?phosphorus.as_ref().map(|p| p.class),
        k_class = ?potassium.as_ref().map(|k| k.class),
        "Diagnosed soil sample"
    );

    DiagnosticReport {
        texture_class,
        ctc_class,
        organic_matter: classify_organic_matter(sample.organic_matter_pct),
        phosphorus,
        potassium,
        calcium: classify_ca(sample.ca),
        magnesium: classify_mg(sample.mg),
        sulfur: classify_s(sample.s),
        sulfur_adequate_for_soy: s_adequate_for_soy(sample.s),
        zinc: classify_zn(sample.zn),
        copper: classify_cu(sample.cu),
        boron: classify_b(sample.b),
        manganese: classify_mn(sample.mn),
        alerts: collect_alerts(sample),
        notes: vec![
            "Critical level is the upper bound of the Medium class.".to_string(),
            "Interpretation for soybean (P group 2, K group 2), Mehlich-1 extraction.".to_string(),
        ],
    }
}
