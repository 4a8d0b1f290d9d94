//! Lime dose methods and dose adjustments
//!
//! All doses are t/ha at PRNT 100% until `adjust_for_prnt` is applied.

use crate::error::{RecommendationError, Result};
use crate::types::TargetPh;
use serde::{Deserialize, Serialize};

/// Maximum surface application under no-till (t/ha).
pub const SURFACE_CAP_T_HA: f64 = 5.0;

/// Fraction of the dose applied on the surface under consolidated no-till.
pub const SURFACE_FRACTION: f64 = 0.25;

/// Liming calculation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimingMethod {
    Smp,
    BaseSaturation,
    Polynomial,
}

impl LimingMethod {
    pub fn label(&self) -> &'static str {
        match self {
            LimingMethod::Smp => "SMP index",
            LimingMethod::BaseSaturation => "Base saturation (V%)",
            LimingMethod::Polynomial => "Polynomial (OM and Al)",
        }
    }
}

/// Polynomial coefficients: dose = a + b·OM + c·Al
#[derive(Debug, Clone, Copy)]
struct PolynomialCoefficients {
    a: f64,
    b_om: f64,
    c_al: f64,
}

fn polynomial_coefficients(target: TargetPh) -> PolynomialCoefficients {
    match target {
        TargetPh::Ph5_5 => PolynomialCoefficients { a: -0.653, b_om: 0.480, c_al: 1.937 },
        TargetPh::Ph6_0 => PolynomialCoefficients { a: -0.516, b_om: 0.805, c_al: 2.435 },
        TargetPh::Ph6_5 => PolynomialCoefficients { a: -0.122, b_om: 1.193, c_al: 2.713 },
    }
}

/// Base-saturation method: (V_target - V_current) / 100 × CTC.
///
/// May be negative when the soil is already above target; callers clamp.
pub fn lime_dose_from_v(ctc: f64, v_current: f64, target: TargetPh) -> f64 {
    (target.v_target() - v_current) / 100.0 * ctc
}

/// Polynomial method from organic matter (%) and exchangeable Al (cmolc/dm³).
pub fn lime_dose_from_polynomial(om_pct: f64, al: f64, target: TargetPh) -> f64 {
    let c = polynomial_coefficients(target);
    c.a + c.b_om * om_pct + c.c_al * al
}

/// Convert a PRNT-100% dose to the dose of a material with the given PRNT (%).
pub fn adjust_for_prnt(dose: f64, prnt_pct: f64) -> Result<f64> {
    if prnt_pct.is_nan() || prnt_pct <= 0.0 {
        return Err(RecommendationError::unsupported("PRNT", prnt_pct));
    }
    Ok(dose * 100.0 / prnt_pct)
}

/// Clamp a surface dose to the cap.
pub fn cap_surface(dose: f64, cap: f64) -> f64 {
    dose.min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_v_method() {
        // CTC 10, V 45% -> (75 - 45)/100 × 10 = 3.0
        assert_relative_eq!(lime_dose_from_v(10.0, 45.0, TargetPh::Ph6_0), 3.0, epsilon = 1e-12);
        assert_relative_eq!(lime_dose_from_v(10.0, 45.0, TargetPh::Ph6_5), 4.0, epsilon = 1e-12);
        assert!(lime_dose_from_v(10.0, 90.0, TargetPh::Ph6_0) < 0.0);
    }

    #[test]
    fn test_polynomial_method() {
        // -0.516 + 0.805×2 + 2.435×1 = 3.529
        assert_relative_eq!(
            lime_dose_from_polynomial(2.0, 1.0, TargetPh::Ph6_0),
            3.529,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            lime_dose_from_polynomial(0.0, 0.0, TargetPh::Ph5_5),
            -0.653,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_prnt_adjustment() {
        assert_relative_eq!(adjust_for_prnt(3.2, 80.0).unwrap(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(adjust_for_prnt(2.7, 100.0).unwrap(), 2.7);
        assert!(adjust_for_prnt(1.0, 0.0).is_err());
        assert!(adjust_for_prnt(1.0, -5.0).is_err());
        assert!(adjust_for_prnt(1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_cap_surface_idempotent() {
        for x in [0.0, 2.5, 4.0, 5.0, 7.5, 21.0] {
            let once = cap_surface(x, SURFACE_CAP_T_HA);
            assert_relative_eq!(cap_surface(once, SURFACE_CAP_T_HA), once);
            assert!(once <= SURFACE_CAP_T_HA);
        }
        assert_relative_eq!(cap_surface(4.0, SURFACE_CAP_T_HA), 4.0);
    }
}
