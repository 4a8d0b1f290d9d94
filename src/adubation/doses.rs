//! Dose tables for soybean P₂O₅ and K₂O
//!
//! Reference yield is 3 t/ha; every extra tonne adds 15 kg/ha P₂O₅ and
//! 25 kg/ha K₂O to maintenance. Replacement covers grain export only.

use crate::types::FertilityClass;
use serde::{Deserialize, Serialize};

pub const REFERENCE_YIELD_T_HA: f64 = 3.0;

/// Nutrients handled by the adubation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    P2O5,
    K2O,
}

impl Nutrient {
    pub fn label(&self) -> &'static str {
        match self {
            Nutrient::P2O5 => "P2O5",
            Nutrient::K2O => "K2O",
        }
    }
}

/// Maintenance dose (kg/ha) for the expected yield.
pub fn maintenance_dose(nutrient: Nutrient, yield_t_ha: f64) -> f64 {
    let extra = (yield_t_ha - REFERENCE_YIELD_T_HA).max(0.0);
    match nutrient {
        Nutrient::P2O5 => 45.0 + 15.0 * extra,
        Nutrient::K2O => 75.0 + 25.0 * extra,
    }
}

/// Replacement dose (kg/ha): what the grain removes.
pub fn replacement_dose(nutrient: Nutrient, yield_t_ha: f64) -> f64 {
    match nutrient {
        Nutrient::P2O5 => 14.0 * yield_t_ha,
        Nutrient::K2O => 20.0 * yield_t_ha,
    }
}

/// Total correction (kg/ha) to lift a class to the critical level.
pub fn correction_dose(nutrient: Nutrient, class: FertilityClass) -> f64 {
    match (nutrient, class) {
        (Nutrient::P2O5, FertilityClass::VeryLow) => 160.0,
        (Nutrient::P2O5, FertilityClass::Low) => 80.0,
        (Nutrient::P2O5, FertilityClass::Medium) => 40.0,
        (Nutrient::K2O, FertilityClass::VeryLow) => 120.0,
        (Nutrient::K2O, FertilityClass::Low) => 60.0,
        (Nutrient::K2O, FertilityClass::Medium) => 30.0,
        (_, FertilityClass::High) | (_, FertilityClass::VeryHigh) => 0.0,
    }
}

/// Weakly buffered soils (sandy or low CTC) correct Very Low and Low classes
/// over two cultivations.
pub fn gradual_eligible(class: FertilityClass, clay_pct: Option<f64>, ctc: Option<f64>) -> bool {
    let low_class = matches!(class, FertilityClass::VeryLow | FertilityClass::Low);
    let weak_buffer = matches!(clay_pct, Some(c) if c < 20.0) || matches!(ctc, Some(c) if c < 7.5);
    low_class && weak_buffer
}

/// Share of the correction applied in each cultivation of a gradual program.
pub const GRADUAL_FIRST_SHARE: f64 = 2.0 / 3.0;
pub const GRADUAL_SECOND_SHARE: f64 = 1.0 / 3.0;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_maintenance_for_yield() {
        assert_relative_eq!(maintenance_dose(Nutrient::P2O5, 3.6), 54.0, epsilon = 1e-9);
        assert_relative_eq!(maintenance_dose(Nutrient::K2O, 3.6), 90.0, epsilon = 1e-9);
        // Below the reference yield maintenance does not drop
        assert_relative_eq!(maintenance_dose(Nutrient::P2O5, 2.0), 45.0);
        assert_relative_eq!(maintenance_dose(Nutrient::K2O, 2.0), 75.0);
    }

    #[test]
    fn test_replacement() {
        assert_relative_eq!(replacement_dose(Nutrient::P2O5, 4.0), 56.0);
        assert_relative_eq!(replacement_dose(Nutrient::K2O, 4.0), 80.0);
    }

    #[test]
    fn test_correction_table() {
        assert_relative_eq!(correction_dose(Nutrient::P2O5, FertilityClass::VeryLow), 160.0);
        assert_relative_eq!(correction_dose(Nutrient::K2O, FertilityClass::Medium), 30.0);
        assert_relative_eq!(correction_dose(Nutrient::K2O, FertilityClass::High), 0.0);
    }

    #[test]
    fn test_gradual_shares_sum_to_correction() {
        for class in [FertilityClass::VeryLow, FertilityClass::Low] {
            for nutrient in [Nutrient::P2O5, Nutrient::K2O] {
                let c = correction_dose(nutrient, class);
                assert_relative_eq!(
                    c * GRADUAL_FIRST_SHARE + c * GRADUAL_SECOND_SHARE,
                    c,
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn test_gradual_eligibility() {
        assert!(gradual_eligible(FertilityClass::VeryLow, Some(13.0), Some(12.0)));
        assert!(gradual_eligible(FertilityClass::Low, Some(35.0), Some(5.0)));
        assert!(!gradual_eligible(FertilityClass::Medium, Some(13.0), Some(2.5)));
        assert!(!gradual_eligible(FertilityClass::VeryLow, Some(35.0), Some(12.0)));
        assert!(!gradual_eligible(FertilityClass::VeryLow, None, None));
    }
}
