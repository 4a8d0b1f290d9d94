//! Liming Recommendation
//!
//! Decides whether lime is needed, which method sets the dose, and how the
//! dose is applied under the parcel's management system.
//!
//! Decision order:
//! 1. Validate PRNT
//! 2. No-lime short-circuit (V% and Al saturation already acceptable)
//! 3. Evaluate every method with inputs, clamp at zero
//! 4. Select method (polynomial for weakly buffered soils, else SMP, else V%)
//! 5. Application mode and surface fraction, PRNT adjustment, surface cap

use crate::error::{RecommendationError, Result};
use crate::liming::methods::*;
use crate::liming::smp_table::lime_dose_from_smp;
use crate::types::{ManagementSystem, SoilSample, TargetPh};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// How lime reaches the soil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationMode {
    Incorporated,
    Surface,
}

impl ApplicationMode {
    pub fn timing(&self) -> &'static str {
        match self {
            ApplicationMode::Incorporated => {
                "Apply and incorporate up to 3 months before sowing"
            }
            ApplicationMode::Surface => {
                "Apply on the surface without incorporation up to 3 months before sowing"
            }
        }
    }
}

/// Corrective material advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimeMaterial {
    Dolomitic,
    CalciticOrDolomitic,
}

impl LimeMaterial {
    /// Dolomitic lime when Mg is below 1.0 cmolc/dm³.
    pub fn for_magnesium(mg: Option<f64>) -> Self {
        match mg {
            Some(v) if v < 1.0 => LimeMaterial::Dolomitic,
            _ => LimeMaterial::CalciticOrDolomitic,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LimeMaterial::Dolomitic => "Dolomitic lime (low Mg)",
            LimeMaterial::CalciticOrDolomitic => "Calcitic or dolomitic lime",
        }
    }
}

/// Parcel-level liming options supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimingOptions {
    pub target_ph: TargetPh,
    pub management_system: ManagementSystem,
    /// PRNT of the lime to be used (%)
    pub prnt_pct: f64,
    pub area_ha: Option<f64>,
    pub surface_cap_t_ha: f64,
}

impl Default for LimingOptions {
    fn default() -> Self {
        Self {
            target_ph: TargetPh::default(),
            management_system: ManagementSystem::default(),
            prnt_pct: 100.0,
            area_ha: None,
            surface_cap_t_ha: SURFACE_CAP_T_HA,
        }
    }
}

/// Dose from one method, PRNT 100%, clamped at zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodEstimate {
    pub method: LimingMethod,
    pub dose_t_ha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimingRecommendation {
    pub target_ph: TargetPh,
    pub lime_required: bool,
    pub estimates: Vec<MethodEstimate>,
    pub selected_method: Option<LimingMethod>,
    pub application_mode: ApplicationMode,
    /// Dose at PRNT 100% after the surface fraction
    pub dose_prnt100_t_ha: f64,
    pub prnt_pct: f64,
    /// Dose of the actual material, capped in surface mode
    pub adjusted_dose_t_ha: f64,
    pub total_t: Option<f64>,
    pub material: LimeMaterial,
    pub timing: String,
    pub notes: Vec<String>,
}

// ============================================================================
// Decision helpers
// ============================================================================

/// V% and Al saturation already acceptable; lime can be skipped.
fn lime_not_required(sample: &SoilSample, target: TargetPh) -> bool {
    let v_target = target.v_target();
    let low_al = sample.al_saturation_pct.map_or(true, |al| al < 10.0);

    let v_met = matches!(sample.v_pct, Some(v) if v >= v_target);
    let ph_ok = matches!(sample.ph_water, Some(ph) if ph >= 5.5);
    let v_close = sample.v_pct.map_or(true, |v| v >= v_target - 5.0);

    (v_met && low_al) || (ph_ok && low_al && v_close)
}

/// Weakly buffered soils, where the SMP index overestimates lime need.
fn prefers_polynomial(sample: &SoilSample) -> bool {
    matches!(sample.clay_pct, Some(c) if c < 20.0)
        || matches!(sample.smp_index, Some(s) if s >= 6.3)
        || matches!(sample.ctc, Some(c) if c < 7.5)
}

/// Evaluate each method whose inputs are present.
pub fn method_estimates(sample: &SoilSample, target: TargetPh) -> Vec<MethodEstimate> {
    let polynomial = match (sample.organic_matter_pct, sample.al) {
        (Some(om), Some(al)) => Some(lime_dose_from_polynomial(om, al, target)),
        _ => None,
    };
    let smp = sample.smp_index.map(|s| lime_dose_from_smp(s, target));
    let v = match (sample.ctc, sample.v_pct) {
        (Some(ctc), Some(v)) => Some(lime_dose_from_v(ctc, v, target)),
        _ => None,
    };

    [
        (LimingMethod::Polynomial, polynomial),
        (LimingMethod::Smp, smp),
        (LimingMethod::BaseSaturation, v),
    ]
    .into_iter()
    .filter_map(|(method, dose)| {
        dose.map(|d| MethodEstimate { method, dose_t_ha: d.max(0.0) })
    })
    .collect()
}

/// Pick the preferred method, falling back Polynomial → SMP → V%.
fn select_method(sample: &SoilSample, estimates: &[MethodEstimate]) -> Option<MethodEstimate> {
    let find = |m: LimingMethod| estimates.iter().find(|e| e.method == m).copied();

    let preferred = if prefers_polynomial(sample) {
        LimingMethod::Polynomial
    } else {
        LimingMethod::Smp
    };

    find(preferred).or_else(|| {
        [LimingMethod::Polynomial, LimingMethod::Smp, LimingMethod::BaseSaturation]
            .into_iter()
            .find_map(find)
    })
}

/// Surface under consolidated no-till unless acidity in depth calls for
/// incorporation.
fn application_mode(sample: &SoilSample, system: ManagementSystem) -> ApplicationMode {
    match system {
        ManagementSystem::NoTillConsolidated => {
            let high_al = matches!(sample.al_saturation_pct, Some(al) if al >= 30.0);
            let very_acid = matches!(sample.ph_water, Some(ph) if ph <= 5.2);
            if high_al || very_acid {
                ApplicationMode::Incorporated
            } else {
                ApplicationMode::Surface
            }
        }
        ManagementSystem::Conventional | ManagementSystem::NoTillEstablishment => {
            ApplicationMode::Incorporated
        }
    }
}

// ============================================================================
// Recommendation
// ============================================================================

/// Compute the liming recommendation for one sample.
pub fn recommend_lime(sample: &SoilSample, options: &LimingOptions) -> Result<LimingRecommendation> {
    if options.prnt_pct.is_nan() || options.prnt_pct <= 0.0 {
        return Err(RecommendationError::unsupported("PRNT", options.prnt_pct));
    }

    let target = options.target_ph;
    let mode = application_mode(sample, options.management_system);
    let material = LimeMaterial::for_magnesium(sample.mg);

    if lime_not_required(sample, target) {
        info!(target_ph = target.value(), "Liming not required");
        let current = sample
            .v_pct
            .map(|v| format!("{:.1}%", v))
            .unwrap_or_else(|| "not measured".to_string());
        return Ok(LimingRecommendation {
            target_ph: target,
            lime_required: false,
            estimates: Vec::new(),
            selected_method: None,
            application_mode: mode,
            dose_prnt100_t_ha: 0.0,
            prnt_pct: options.prnt_pct,
            adjusted_dose_t_ha: 0.0,
            total_t: options.area_ha.map(|_| 0.0),
            material,
            timing: mode.timing().to_string(),
            notes: vec![format!(
                "Liming not required. Repeat the analysis next season to monitor V% (current {}, target {:.0}%)",
                current,
                target.v_target()
            )],
        });
    }

    let estimates = method_estimates(sample, target);
    let selected = select_method(sample, &estimates).ok_or_else(|| {
        RecommendationError::InsufficientData(
            "no liming method has its inputs (SMP index, CTC with V%, or OM with Al)".to_string(),
        )
    })?;
    debug!(method = ?selected.method, dose = selected.dose_t_ha, "Selected liming method");

    let mut notes = Vec::new();
    let dose_prnt100 = match mode {
        ApplicationMode::Surface => {
            notes.push(format!(
                "Consolidated no-till: {:.0}% of the {} dose applied on the surface",
                SURFACE_FRACTION * 100.0,
                selected.method.label()
            ));
            selected.dose_t_ha * SURFACE_FRACTION
        }
        ApplicationMode::Incorporated => selected.dose_t_ha,
    };

    let mut adjusted = adjust_for_prnt(dose_prnt100, options.prnt_pct)?;
    if mode == ApplicationMode::Surface && adjusted > options.surface_cap_t_ha {
        notes.push(format!(
            "Surface dose limited to {:.1} t/ha",
            options.surface_cap_t_ha
        ));
        adjusted = cap_surface(adjusted, options.surface_cap_t_ha);
    }

    Ok(LimingRecommendation {
        target_ph: target,
        lime_required: adjusted > 0.0,
        estimates,
        selected_method: Some(selected.method),
        application_mode: mode,
        dose_prnt100_t_ha: dose_prnt100,
        prnt_pct: options.prnt_pct,
        adjusted_dose_t_ha: adjusted,
        total_t: options.area_ha.map(|area| adjusted * area),
        material,
        timing: mode.timing().to_string(),
        notes,
    })
}
