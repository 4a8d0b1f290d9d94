//! Recommendation configuration
//!
//! Every tunable the engine accepts, supplied by the caller per request.
//! Loadable from JSON; missing keys take the soybean defaults.

use crate::liming::{LimingOptions, SURFACE_CAP_T_HA};
use crate::types::{Cultivation, ManagementSystem, RoundingMode, TargetPh, VeryHighStrategy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub target_ph: TargetPh,
    pub management_system: ManagementSystem,
    /// PRNT of the lime to be used (%)
    pub prnt_pct: f64,
    pub surface_cap_t_ha: f64,
    pub rounding: RoundingMode,
    pub very_high_strategy: VeryHighStrategy,
    /// 1 or 2
    pub cultivation_cycle: u8,
    /// Added on top of the Very High outcome
    pub starter_p2o5_kg_ha: f64,
    pub starter_k2o_kg_ha: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            target_ph: TargetPh::Ph6_0,
            management_system: ManagementSystem::Conventional,
            prnt_pct: 100.0,
            surface_cap_t_ha: SURFACE_CAP_T_HA,
            rounding: RoundingMode::NearestFive,
            very_high_strategy: VeryHighStrategy::Replace,
            cultivation_cycle: 1,
            starter_p2o5_kg_ha: 0.0,
            starter_k2o_kg_ha: 0.0,
        }
    }
}

impl RecommendationConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: RecommendationConfig = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse recommendation config JSON")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot use
    pub fn validate(&self) -> Result<()> {
        if self.prnt_pct.is_nan() || self.prnt_pct <= 0.0 {
            anyhow::bail!("PRNT must be positive, got {}", self.prnt_pct);
        }
        if self.surface_cap_t_ha.is_nan() || self.surface_cap_t_ha <= 0.0 {
            anyhow::bail!("Surface cap must be positive, got {}", self.surface_cap_t_ha);
        }
        if self.starter_p2o5_kg_ha < 0.0 || self.starter_k2o_kg_ha < 0.0 {
            anyhow::bail!("Starter doses cannot be negative");
        }
        self.cultivation()?;
        Ok(())
    }

    pub fn cultivation(&self) -> Result<Cultivation> {
        Cultivation::from_number(self.cultivation_cycle)
            .with_context(|| "Invalid cultivation_cycle in config")
    }

    pub fn liming_options(&self, area_ha: Option<f64>) -> LimingOptions {
        LimingOptions {
            target_ph: self.target_ph,
            management_system: self.management_system,
            prnt_pct: self.prnt_pct,
            area_ha,
            surface_cap_t_ha: self.surface_cap_t_ha,
        }
    }
}
