//! Classification functions for soil-analysis interpretation.
//!
//! Every classifier takes an optional measurement and returns `None` when the
//! measurement (or the context it depends on) is absent.

use crate::classification::lookup_tables::*;
use crate::types::*;

// ============================================================================
// Texture, CTC and organic matter
// ============================================================================

/// Classify texture by clay percentage.
/// - > 60%: class 1 (very clayey)
/// - > 40%: class 2 (clayey)
/// - > 20%: class 3 (medium)
/// - otherwise: class 4 (sandy)
pub fn classify_clay(clay_pct: Option<f64>) -> Option<TextureClass> {
    match clay_pct {
        Some(c) if c > 60.0 => Some(TextureClass::VeryClayey),
        Some(c) if c > 40.0 => Some(TextureClass::Clayey),
        Some(c) if c > 20.0 => Some(TextureClass::Medium),
        Some(_) => Some(TextureClass::Sandy),
        None => None,
    }
}

/// Classify CTC at pH 7 (cmolc/dm³).
pub fn classify_ctc(ctc: Option<f64>) -> Option<CtcClass> {
    match ctc {
        Some(c) if c <= 7.5 => Some(CtcClass::Low),
        Some(c) if c <= 15.0 => Some(CtcClass::Medium),
        Some(c) if c <= 30.0 => Some(CtcClass::High),
        Some(_) => Some(CtcClass::VeryHigh),
        None => None,
    }
}

/// Classify organic matter (%).
pub fn classify_organic_matter(om_pct: Option<f64>) -> Option<NutrientLevel> {
    classify_closed(om_pct, OM_LEVELS)
}

// ============================================================================
// Phosphorus and potassium
// ============================================================================

/// Walk an ordered bin table; above the last bound is Very High.
pub fn classify_in_bins(value: f64, bins: &[FertilityBin]) -> FertilityClass {
    bins.iter()
        .find(|bin| value <= bin.upper)
        .map(|bin| bin.class)
        .unwrap_or(FertilityClass::VeryHigh)
}

/// Classify P (mg/dm³) using the table for the sample's texture class.
/// Returns the class together with the texture class used.
pub fn classify_p(p: Option<f64>, clay_pct: Option<f64>) -> Option<(FertilityClass, TextureClass)> {
    let texture = classify_clay(clay_pct)?;
    let p = p?;
    Some((classify_in_bins(p, p_bins(texture)), texture))
}

/// Classify K (mg/dm³) using the table for the sample's CTC class.
/// Returns the class together with the CTC class used.
pub fn classify_k(k: Option<f64>, ctc: Option<f64>) -> Option<(FertilityClass, CtcClass)> {
    let ctc_class = classify_ctc(ctc)?;
    let k = k?;
    Some((classify_in_bins(k, k_bins(ctc_class)), ctc_class))
}

/// Probability of yield response for a P or K class.
pub fn prob_response(class: FertilityClass) -> ResponseProbability {
    match class {
        FertilityClass::VeryLow => ResponseProbability::VeryHigh,
        FertilityClass::Low => ResponseProbability::High,
        FertilityClass::Medium => ResponseProbability::Medium,
        FertilityClass::High | FertilityClass::VeryHigh => ResponseProbability::Low,
    }
}

// ============================================================================
// Tri-level nutrients
// ============================================================================

/// Open lower bound: value < low is Low, value <= mid is Medium.
fn classify_level(value: Option<f64>, t: LevelThresholds) -> Option<NutrientLevel> {
    match value {
        Some(v) if v < t.low => Some(NutrientLevel::Low),
        Some(v) if v <= t.mid => Some(NutrientLevel::Medium),
        Some(_) => Some(NutrientLevel::High),
        None => None,
    }
}

/// Closed bounds: value <= low is Low, value <= mid is Medium.
fn classify_closed(value: Option<f64>, t: LevelThresholds) -> Option<NutrientLevel> {
    match value {
        Some(v) if v <= t.low => Some(NutrientLevel::Low),
        Some(v) if v <= t.mid => Some(NutrientLevel::Medium),
        Some(_) => Some(NutrientLevel::High),
        None => None,
    }
}

pub fn classify_ca(ca: Option<f64>) -> Option<NutrientLevel> {
    classify_level(ca, CA_LEVELS)
}

pub fn classify_mg(mg: Option<f64>) -> Option<NutrientLevel> {
    classify_level(mg, MG_LEVELS)
}

pub fn classify_s(s: Option<f64>) -> Option<NutrientLevel> {
    classify_level(s, S_LEVELS)
}

pub fn classify_zn(zn: Option<f64>) -> Option<NutrientLevel> {
    classify_level(zn, ZN_LEVELS)
}

pub fn classify_cu(cu: Option<f64>) -> Option<NutrientLevel> {
    classify_level(cu, CU_LEVELS)
}

pub fn classify_mn(mn: Option<f64>) -> Option<NutrientLevel> {
    classify_level(mn, MN_LEVELS)
}

pub fn classify_b(b: Option<f64>) -> Option<NutrientLevel> {
    classify_closed(b, B_LEVELS)
}

/// Whether measured S meets the soybean requirement.
pub fn s_adequate_for_soy(s: Option<f64>) -> Option<bool> {
    s.map(|v| v >= S_ADEQUATE_SOY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_clay_breakpoints() {
        assert_eq!(classify_clay(Some(65.0)), Some(TextureClass::VeryClayey));
        assert_eq!(classify_clay(Some(60.0)), Some(TextureClass::Clayey));
        assert_eq!(classify_clay(Some(40.5)), Some(TextureClass::Clayey));
        assert_eq!(classify_clay(Some(40.0)), Some(TextureClass::Medium));
        assert_eq!(classify_clay(Some(20.0)), Some(TextureClass::Sandy));
        assert_eq!(classify_clay(Some(13.0)), Some(TextureClass::Sandy));
        assert_eq!(classify_clay(None), None);
    }

    #[test]
    fn test_classify_ctc() {
        assert_eq!(classify_ctc(Some(2.5)), Some(CtcClass::Low));
        assert_eq!(classify_ctc(Some(7.5)), Some(CtcClass::Low));
        assert_eq!(classify_ctc(Some(7.6)), Some(CtcClass::Medium));
        assert_eq!(classify_ctc(Some(30.0)), Some(CtcClass::High));
        assert_eq!(classify_ctc(Some(31.0)), Some(CtcClass::VeryHigh));
    }

    #[test]
    fn test_classify_p_closed_upper_bounds() {
        // Sandy soil: VL <= 10, L <= 20, M <= 30, H <= 60
        let clay = Some(13.0);
        assert_eq!(classify_p(Some(2.6), clay).map(|r| r.0), Some(FertilityClass::VeryLow));
        assert_eq!(classify_p(Some(10.0), clay).map(|r| r.0), Some(FertilityClass::VeryLow));
        assert_eq!(classify_p(Some(10.1), clay).map(|r| r.0), Some(FertilityClass::Low));
        assert_eq!(classify_p(Some(60.0), clay).map(|r| r.0), Some(FertilityClass::High));
        assert_eq!(classify_p(Some(60.1), clay).map(|r| r.0), Some(FertilityClass::VeryHigh));

        // Very clayey soil uses the tighter table
        assert_eq!(classify_p(Some(7.0), Some(65.0)).map(|r| r.0), Some(FertilityClass::Medium));
    }

    #[test]
    fn test_classify_k() {
        assert_eq!(
            classify_k(Some(21.0), Some(2.5)),
            Some((FertilityClass::Low, CtcClass::Low))
        );
        assert_eq!(classify_k(Some(130.0), Some(20.0)).map(|r| r.0), Some(FertilityClass::High));
        assert_eq!(classify_k(Some(300.0), Some(40.0)).map(|r| r.0), Some(FertilityClass::VeryHigh));
    }

    #[test]
    fn test_missing_context_is_unclassified() {
        assert_eq!(classify_p(Some(5.0), None), None);
        assert_eq!(classify_p(None, Some(30.0)), None);
        assert_eq!(classify_k(Some(50.0), None), None);
        assert_eq!(classify_ca(None), None);
    }

    #[test]
    fn test_classification_total_and_monotone() {
        let clays = [10.0, 30.0, 50.0, 70.0];
        for clay in clays {
            let mut previous = FertilityClass::VeryLow;
            let mut p = 0.0;
            while p <= 100.0 {
                let (class, _) = classify_p(Some(p), Some(clay)).unwrap();
                assert!(class >= previous, "P={} clay={} went down", p, clay);
                previous = class;
                p += 0.25;
            }
        }

        let ctcs = [5.0, 10.0, 20.0, 35.0];
        for ctc in ctcs {
            let mut previous = FertilityClass::VeryLow;
            let mut k = 0.0;
            while k <= 400.0 {
                let (class, _) = classify_k(Some(k), Some(ctc)).unwrap();
                assert!(class >= previous);
                previous = class;
                k += 1.0;
            }
        }
    }

    #[test]
    fn test_tri_level_bounds() {
        assert_eq!(classify_ca(Some(0.3)), Some(NutrientLevel::Low));
        assert_eq!(classify_ca(Some(2.0)), Some(NutrientLevel::Medium));
        assert_eq!(classify_ca(Some(4.0)), Some(NutrientLevel::Medium));
        assert_eq!(classify_ca(Some(4.1)), Some(NutrientLevel::High));
        assert_eq!(classify_mg(Some(0.2)), Some(NutrientLevel::Low));
        assert_eq!(classify_s(Some(2.8)), Some(NutrientLevel::Medium));
        assert_eq!(classify_zn(Some(0.3)), Some(NutrientLevel::Low));
        assert_eq!(classify_cu(Some(0.5)), Some(NutrientLevel::High));
        assert_eq!(classify_mn(Some(4.0)), Some(NutrientLevel::Medium));
        // Boron uses closed bounds
        assert_eq!(classify_b(Some(0.2)), Some(NutrientLevel::Low));
        assert_eq!(classify_b(Some(0.1)), Some(NutrientLevel::Low));
        assert_eq!(classify_b(Some(0.5)), Some(NutrientLevel::Medium));
        assert_eq!(classify_organic_matter(Some(0.6)), Some(NutrientLevel::Low));
        assert_eq!(classify_organic_matter(Some(3.0)), Some(NutrientLevel::Medium));
    }

    #[test]
    fn test_prob_response() {
        assert_eq!(prob_response(FertilityClass::VeryLow), ResponseProbability::VeryHigh);
        assert_eq!(prob_response(FertilityClass::Medium), ResponseProbability::Medium);
        assert_eq!(prob_response(FertilityClass::VeryHigh), ResponseProbability::Low);
        assert_eq!(s_adequate_for_soy(Some(10.0)), Some(true));
        assert_eq!(s_adequate_for_soy(Some(2.8)), Some(false));
    }
}
