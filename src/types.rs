//! Core types for soil-analysis recommendations
//!
//! Classification enums, caller-supplied configuration enums and the
//! `SoilSample` input record, plus helpers for reading loosely typed
//! field maps.

use crate::error::{RecommendationError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Classification enums
// ============================================================================

/// Ordinal fertility class for phosphorus and potassium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FertilityClass {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl FertilityClass {
    pub fn label(&self) -> &'static str {
        match self {
            FertilityClass::VeryLow => "Very Low",
            FertilityClass::Low => "Low",
            FertilityClass::Medium => "Medium",
            FertilityClass::High => "High",
            FertilityClass::VeryHigh => "Very High",
        }
    }

    /// Ordinal index, 0 (Very Low) to 4 (Very High).
    pub fn index(&self) -> u8 {
        *self as u8
    }
}

/// Three-level class used for Ca, Mg, S, micronutrients and organic matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutrientLevel {
    Low,
    Medium,
    High,
}

impl NutrientLevel {
    pub fn label(&self) -> &'static str {
        match self {
            NutrientLevel::Low => "Low",
            NutrientLevel::Medium => "Medium",
            NutrientLevel::High => "High",
        }
    }
}

/// Texture class by clay content (manual classes 1 to 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureClass {
    VeryClayey, // class 1, > 60%
    Clayey,     // class 2, 41-60%
    Medium,     // class 3, 21-40%
    Sandy,      // class 4, <= 20%
}

impl TextureClass {
    pub fn label(&self) -> &'static str {
        match self {
            TextureClass::VeryClayey => "Class 1 (very clayey)",
            TextureClass::Clayey => "Class 2 (clayey)",
            TextureClass::Medium => "Class 3 (medium)",
            TextureClass::Sandy => "Class 4 (sandy)",
        }
    }
}

/// CTC at pH 7 class (cmolc/dm³).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtcClass {
    Low,      // <= 7.5
    Medium,   // 7.6-15
    High,     // 15.1-30
    VeryHigh, // > 30
}

impl CtcClass {
    pub fn label(&self) -> &'static str {
        match self {
            CtcClass::Low => "Low (<= 7.5)",
            CtcClass::Medium => "Medium (7.6-15)",
            CtcClass::High => "High (15.1-30)",
            CtcClass::VeryHigh => "Very High (> 30)",
        }
    }
}

/// Probability of crop response to fertilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseProbability {
    VeryHigh,
    High,
    Medium,
    Low,
}

impl ResponseProbability {
    pub fn label(&self) -> &'static str {
        match self {
            ResponseProbability::VeryHigh => "Very High",
            ResponseProbability::High => "High",
            ResponseProbability::Medium => "Medium",
            ResponseProbability::Low => "Low",
        }
    }
}

// ============================================================================
// Caller-supplied configuration enums
// ============================================================================

/// Liming target pH. Only the three tabulated targets are supported.
///
/// Serializes as "5.5", "6.0" or "6.5"; deserializes from those strings
/// (decimal comma allowed) or from a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TargetPhValue")]
pub enum TargetPh {
    #[serde(rename = "5.5")]
    Ph5_5,
    #[serde(rename = "6.0")]
    Ph6_0,
    #[serde(rename = "6.5")]
    Ph6_5,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TargetPhValue {
    Number(f64),
    Text(String),
}

impl TryFrom<TargetPhValue> for TargetPh {
    type Error = RecommendationError;

    fn try_from(raw: TargetPhValue) -> Result<Self> {
        match raw {
            TargetPhValue::Number(ph) => TargetPh::from_value(ph),
            TargetPhValue::Text(text) => match parse_decimal(&text) {
                Some(ph) => TargetPh::from_value(ph),
                None => Err(RecommendationError::unsupported("target pH", text)),
            },
        }
    }
}

impl Default for TargetPh {
    fn default() -> Self {
        TargetPh::Ph6_0
    }
}

impl TargetPh {
    pub fn from_value(ph: f64) -> Result<Self> {
        match ph {
            v if (v - 5.5).abs() < 1e-9 => Ok(TargetPh::Ph5_5),
            v if (v - 6.0).abs() < 1e-9 => Ok(TargetPh::Ph6_0),
            v if (v - 6.5).abs() < 1e-9 => Ok(TargetPh::Ph6_5),
            _ => Err(RecommendationError::unsupported("target pH", ph)),
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            TargetPh::Ph5_5 => 5.5,
            TargetPh::Ph6_0 => 6.0,
            TargetPh::Ph6_5 => 6.5,
        }
    }

    /// Base saturation (V%) reached at this pH.
    pub fn v_target(&self) -> f64 {
        match self {
            TargetPh::Ph5_5 => 65.0,
            TargetPh::Ph6_0 => 75.0,
            TargetPh::Ph6_5 => 85.0,
        }
    }
}

/// Tillage system of the parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagementSystem {
    #[default]
    Conventional,
    NoTillEstablishment,
    NoTillConsolidated,
}

impl ManagementSystem {
    pub fn label(&self) -> &'static str {
        match self {
            ManagementSystem::Conventional => "Conventional",
            ManagementSystem::NoTillEstablishment => "No-till (establishment)",
            ManagementSystem::NoTillConsolidated => "No-till (consolidated)",
        }
    }
}

/// What to do when a nutrient is already Very High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VeryHighStrategy {
    /// Replace what the harvest exports.
    #[default]
    Replace,
    /// Skip the nutrient in both cultivations.
    ZeroAndZero,
    /// Skip it in the first cultivation, then apply maintenance.
    ZeroThenMaintenance,
}

/// Cultivation cycle within the correction program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cultivation {
    #[default]
    First,
    Second,
}

impl Cultivation {
    pub fn from_number(n: u8) -> Result<Self> {
        match n {
            1 => Ok(Cultivation::First),
            2 => Ok(Cultivation::Second),
            _ => Err(RecommendationError::unsupported("cultivation cycle", n)),
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Cultivation::First => 1,
            Cultivation::Second => 2,
        }
    }
}

/// Rounding applied to reported P₂O₅/K₂O doses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    #[default]
    NearestFive,
    OneDecimal,
}

impl RoundingMode {
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            RoundingMode::NearestFive => (value / 5.0).round() * 5.0,
            RoundingMode::OneDecimal => (value * 10.0).round() / 10.0,
        }
    }
}

// ============================================================================
// Soil sample
// ============================================================================

/// One laboratory soil analysis. `None` means "not measured".
///
/// Units: pH in water; clay and organic matter in %; CTC, Ca, Mg and Al in
/// cmolc/dm³; P, K, S and micronutrients in mg/dm³; V% and Al saturation in %.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilSample {
    pub ph_water: Option<f64>,
    pub smp_index: Option<f64>,
    pub clay_pct: Option<f64>,
    pub ctc: Option<f64>,
    pub organic_matter_pct: Option<f64>,
    pub p: Option<f64>,
    pub k: Option<f64>,
    pub s: Option<f64>,
    pub ca: Option<f64>,
    pub mg: Option<f64>,
    pub zn: Option<f64>,
    pub cu: Option<f64>,
    pub b: Option<f64>,
    pub mn: Option<f64>,
    pub v_pct: Option<f64>,
    pub al_saturation_pct: Option<f64>,
    pub al: Option<f64>,
}

impl SoilSample {
    /// Populate a sample from a loosely typed field map (form data, JSON).
    ///
    /// Numbers may arrive as JSON numbers or strings with a decimal comma.
    /// Missing or unparseable fields become `None`, never zero.
    pub fn from_fields(data: &HashMap<String, Value>) -> Self {
        SoilSample {
            ph_water: get_f64(data, "ph_water"),
            smp_index: get_f64(data, "smp_index"),
            clay_pct: get_f64(data, "clay_pct"),
            ctc: get_f64(data, "ctc"),
            organic_matter_pct: get_f64(data, "organic_matter_pct"),
            p: get_f64(data, "p"),
            k: get_f64(data, "k"),
            s: get_f64(data, "s"),
            ca: get_f64(data, "ca"),
            mg: get_f64(data, "mg"),
            zn: get_f64(data, "zn"),
            cu: get_f64(data, "cu"),
            b: get_f64(data, "b"),
            mn: get_f64(data, "mn"),
            v_pct: get_f64(data, "v_pct"),
            al_saturation_pct: get_f64(data, "al_saturation_pct"),
            al: get_f64(data, "al"),
        }
    }
}

// ============================================================================
// Helper functions for extracting values from HashMap<String, Value>
// ============================================================================

/// Parse a decimal number, accepting either '.' or ',' as separator.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Extract an f64 value from a field map.
/// Handles both numeric JSON values and string-encoded numbers.
pub fn get_f64(data: &HashMap<String, Value>, key: &str) -> Option<f64> {
    data.get(key).and_then(|v| {
        v.as_f64()
            .or_else(|| v.as_str().and_then(parse_decimal))
    })
}

/// Require a value, naming the field in the error when it is absent.
pub fn require(value: Option<f64>, field: &str) -> Result<f64> {
    value.ok_or_else(|| RecommendationError::invalid_input(field, "value is required"))
}

/// Molybdenum is carried in kg/ha internally and shown in g/ha.
pub fn fmt_g_ha(kg_ha: f64) -> String {
    format!("{:.0} g/ha", kg_ha * 1000.0)
}
