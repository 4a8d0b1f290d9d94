//! Interpretation tables for Mehlich-1 soil analysis
//!
//! Each table is an ordered list of closed upper bounds. The first bound with
//! `value <= upper` wins; anything above the last bound is Very High.
//!
//! Data source: CQFS-RS/SC (2016), soybean, Mehlich-1 extraction.

use crate::types::{CtcClass, FertilityClass, TextureClass};

/// A single fertility bin with its closed upper bound.
#[derive(Debug, Clone)]
pub struct FertilityBin {
    pub class: FertilityClass,
    pub upper: f64,
}

/// Tri-level thresholds: below `low` is Low, up to `mid` is Medium.
#[derive(Debug, Clone, Copy)]
pub struct LevelThresholds {
    pub low: f64,
    pub mid: f64,
}

// ============================================================================
// PHOSPHORUS (mg/dm³) BY TEXTURE CLASS
// ============================================================================

static P_CLASS_1: &[FertilityBin] = &[
    FertilityBin { class: FertilityClass::VeryLow, upper: 3.0 },
    FertilityBin { class: FertilityClass::Low, upper: 6.0 },
    FertilityBin { class: FertilityClass::Medium, upper: 9.0 },
    FertilityBin { class: FertilityClass::High, upper: 18.0 },
];

static P_CLASS_2: &[FertilityBin] = &[
    FertilityBin { class: FertilityClass::VeryLow, upper: 4.0 },
    FertilityBin { class: FertilityClass::Low, upper: 8.0 },
    FertilityBin { class: FertilityClass::Medium, upper: 12.0 },
    FertilityBin { class: FertilityClass::High, upper: 24.0 },
];

static P_CLASS_3: &[FertilityBin] = &[
    FertilityBin { class: FertilityClass::VeryLow, upper: 6.0 },
    FertilityBin { class: FertilityClass::Low, upper: 12.0 },
    FertilityBin { class: FertilityClass::Medium, upper: 18.0 },
    FertilityBin { class: FertilityClass::High, upper: 36.0 },
];

static P_CLASS_4: &[FertilityBin] = &[
    FertilityBin { class: FertilityClass::VeryLow, upper: 10.0 },
    FertilityBin { class: FertilityClass::Low, upper: 20.0 },
    FertilityBin { class: FertilityClass::Medium, upper: 30.0 },
    FertilityBin { class: FertilityClass::High, upper: 60.0 },
];

// ============================================================================
// POTASSIUM (mg/dm³) BY CTC CLASS
// ============================================================================

static K_CTC_LOW: &[FertilityBin] = &[
    FertilityBin { class: FertilityClass::VeryLow, upper: 20.0 },
    FertilityBin { class: FertilityClass::Low, upper: 40.0 },
    FertilityBin { class: FertilityClass::Medium, upper: 60.0 },
    FertilityBin { class: FertilityClass::High, upper: 120.0 },
];

static K_CTC_MEDIUM: &[FertilityBin] = &[
    FertilityBin { class: FertilityClass::VeryLow, upper: 30.0 },
    FertilityBin { class: FertilityClass::Low, upper: 60.0 },
    FertilityBin { class: FertilityClass::Medium, upper: 90.0 },
    FertilityBin { class: FertilityClass::High, upper: 180.0 },
];

static K_CTC_HIGH: &[FertilityBin] = &[
    FertilityBin { class: FertilityClass::VeryLow, upper: 40.0 },
    FertilityBin { class: FertilityClass::Low, upper: 80.0 },
    FertilityBin { class: FertilityClass::Medium, upper: 120.0 },
    FertilityBin { class: FertilityClass::High, upper: 240.0 },
];

static K_CTC_VERY_HIGH: &[FertilityBin] = &[
    FertilityBin { class: FertilityClass::VeryLow, upper: 45.0 },
    FertilityBin { class: FertilityClass::Low, upper: 90.0 },
    FertilityBin { class: FertilityClass::Medium, upper: 135.0 },
    FertilityBin { class: FertilityClass::High, upper: 270.0 },
];

// ============================================================================
// SECONDARY NUTRIENTS AND MICRONUTRIENTS
// ============================================================================

/// Ca, cmolc/dm³
pub const CA_LEVELS: LevelThresholds = LevelThresholds { low: 2.0, mid: 4.0 };
/// Mg, cmolc/dm³
pub const MG_LEVELS: LevelThresholds = LevelThresholds { low: 0.5, mid: 1.0 };
/// S-SO₄, mg/dm³
pub const S_LEVELS: LevelThresholds = LevelThresholds { low: 2.0, mid: 5.0 };
/// Zn, mg/dm³
pub const ZN_LEVELS: LevelThresholds = LevelThresholds { low: 0.5, mid: 1.0 };
/// Cu, mg/dm³
pub const CU_LEVELS: LevelThresholds = LevelThresholds { low: 0.2, mid: 0.4 };
/// Mn, mg/dm³
pub const MN_LEVELS: LevelThresholds = LevelThresholds { low: 2.5, mid: 5.0 };
/// B, mg/dm³. Unlike the others both bounds are closed (<= 0.2 is Low).
pub const B_LEVELS: LevelThresholds = LevelThresholds { low: 0.2, mid: 0.5 };
/// Organic matter, %. Closed bounds like boron.
pub const OM_LEVELS: LevelThresholds = LevelThresholds { low: 2.5, mid: 5.0 };

/// Sulfur at or above this level is adequate for soybean (mg/dm³).
pub const S_ADEQUATE_SOY: f64 = 10.0;

/// Get the phosphorus table for a texture class.
pub fn p_bins(texture: TextureClass) -> &'static [FertilityBin] {
    match texture {
        TextureClass::VeryClayey => P_CLASS_1,
        TextureClass::Clayey => P_CLASS_2,
        TextureClass::Medium => P_CLASS_3,
        TextureClass::Sandy => P_CLASS_4,
    }
}

/// Get the potassium table for a CTC class.
pub fn k_bins(ctc: CtcClass) -> &'static [FertilityBin] {
    match ctc {
        CtcClass::Low => K_CTC_LOW,
        CtcClass::Medium => K_CTC_MEDIUM,
        CtcClass::High => K_CTC_HIGH,
        CtcClass::VeryHigh => K_CTC_VERY_HIGH,
    }
}

/// Upper bound of the Medium class: the critical level for the table.
pub fn critical_level(bins: &[FertilityBin]) -> Option<f64> {
    bins.iter()
        .find(|b| b.class == FertilityClass::Medium)
        .map(|b| b.upper)
}
