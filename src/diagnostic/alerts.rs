use crate::types::SoilSample;
use serde::{Deserialize, Serialize};

/// Warning raised by the diagnostic for micronutrient availability risks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCard {
    pub alert_type: String, // "boron_deficiency_risk", "low_ph_mo_b", "high_ph_micronutrients"
    pub severity: Severity,
    pub message: String,
    pub detail: String,
    pub advice: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Medium,
    High,
}

/// Low organic matter on sandy soil: boron leaches readily.
pub fn check_boron_risk(sample: &SoilSample) -> Option<AlertCard> {
    match (sample.organic_matter_pct, sample.clay_pct) {
        (Some(om), Some(clay)) if om < 2.0 && clay < 20.0 => Some(AlertCard {
            alert_type: "boron_deficiency_risk".to_string(),
            severity: Severity::High,
            message: "Boron deficiency risk on sandy soil with low organic matter".to_string(),
            detail: format!("Organic matter {:.1}%, clay {:.0}%", om, clay),
            advice: "Consider boron in the fertilizer program".to_string(),
        }),
        _ => None,
    }
}

/// Acid soil restricts molybdenum and boron availability.
pub fn check_low_ph(sample: &SoilSample) -> Option<AlertCard> {
    match sample.ph_water {
        Some(ph) if ph < 5.5 => Some(AlertCard {
            alert_type: "low_ph_mo_b".to_string(),
            severity: Severity::Medium,
            message: "Molybdenum and boron deficiency risk at low pH".to_string(),
            detail: format!("pH(water) {:.1} < 5.5", ph),
            advice: "Correct acidity; molybdenum on seed is recommended".to_string(),
        }),
        _ => None,
    }
}

/// Alkaline drift restricts Zn, Cu, Fe and Mn availability.
pub fn check_high_ph(sample: &SoilSample) -> Option<AlertCard> {
    match sample.ph_water {
        Some(ph) if ph > 6.5 => Some(AlertCard {
            alert_type: "high_ph_micronutrients".to_string(),
            severity: Severity::Medium,
            message: "Zn, Cu, Fe and Mn availability risk at high pH".to_string(),
            detail: format!("pH(water) {:.1} > 6.5", ph),
            advice: "Avoid over-liming; monitor micronutrients".to_string(),
        }),
        _ => None,
    }
}

/// Run every alert check in a fixed order.
pub fn collect_alerts(sample: &SoilSample) -> Vec<AlertCard> {
    [check_boron_risk(sample), check_low_ph(sample), check_high_ph(sample)]
        .into_iter()
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boron_risk() {
        let sample = SoilSample {
            organic_matter_pct: Some(0.6),
            clay_pct: Some(13.0),
            ..Default::default()
        };
        let alert = check_boron_risk(&sample).unwrap();
        assert_eq!(alert.alert_type, "boron_deficiency_risk");
        assert!(alert.detail.contains("0.6%"));

        let clayey = SoilSample { clay_pct: Some(45.0), ..sample.clone() };
        assert!(check_boron_risk(&clayey).is_none());

        let unknown = SoilSample { organic_matter_pct: None, ..sample };
        assert!(check_boron_risk(&unknown).is_none());
    }

    #[test]
    fn test_ph_alerts_are_exclusive() {
        let acid = SoilSample { ph_water: Some(4.7), ..Default::default() };
        let alerts = collect_alerts(&acid);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, "low_ph_mo_b");

        let alkaline = SoilSample { ph_water: Some(6.8), ..Default::default() };
        let alerts = collect_alerts(&alkaline);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, "high_ph_micronutrients");

        let neutral = SoilSample { ph_water: Some(6.0), ..Default::default() };
        assert!(collect_alerts(&neutral).is_empty());
    }
}
