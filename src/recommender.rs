//! Recommender - Main coordinator for parcel recommendations
//!
//! Composes diagnose → liming → adubation → blend for one parcel, and fans
//! out over many parcels with Rayon. Holds only the caller's configuration.

use crate::adubation::{plan_both_cycles, recommend, AdubationInput, AdubationRecommendation, CyclePlan};
use crate::blend::{allocate, BlendResult, BlendStrategy, NutrientDemand};
use crate::config::RecommendationConfig;
use crate::diagnostic::{diagnose, DiagnosticReport};
use crate::error::{RecommendationError, Result};
use crate::liming::{recommend_lime, LimingRecommendation};
use crate::types::SoilSample;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// One parcel to evaluate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelRequest {
    pub parcel_id: String,
    pub sample: SoilSample,
    pub yield_t_ha: f64,
    #[serde(default)]
    pub area_ha: Option<f64>,
    #[serde(default)]
    pub blend: BlendStrategy,
}

/// Everything computed for one parcel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullRecommendation {
    pub parcel_id: String,
    pub diagnostic: DiagnosticReport,
    /// `None` when no liming method had its inputs
    pub liming: Option<LimingRecommendation>,
    pub adubation: AdubationRecommendation,
    pub blend: BlendResult,
    pub notes: Vec<String>,
}

pub struct Recommender {
    config: RecommendationConfig,
}

impl Recommender {
    pub fn new(config: RecommendationConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn from_config_file(path: &Path) -> anyhow::Result<Self> {
        let config = RecommendationConfig::load(path)?;
        info!(?path, "Loaded recommendation config");
        Ok(Self { config })
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    pub fn diagnose(&self, sample: &SoilSample) -> DiagnosticReport {
        diagnose(sample)
    }

    pub fn recommend_lime(&self, sample: &SoilSample, area_ha: Option<f64>) -> Result<LimingRecommendation> {
        recommend_lime(sample, &self.config.liming_options(area_ha))
    }

    fn adubation_input(&self, report: &DiagnosticReport, sample: &SoilSample, yield_t_ha: f64) -> Result<AdubationInput> {
        AdubationInput::from_diagnostic(report, sample, yield_t_ha, &self.config)
    }

    pub fn recommend_adubation(&self, sample: &SoilSample, yield_t_ha: f64) -> Result<AdubationRecommendation> {
        let report = diagnose(sample);
        recommend(&self.adubation_input(&report, sample, yield_t_ha)?)
    }

    /// Cultivation 1 and 2 of the correction program.
    pub fn plan_cycles(&self, sample: &SoilSample, yield_t_ha: f64) -> Result<CyclePlan> {
        let report = diagnose(sample);
        plan_both_cycles(&self.adubation_input(&report, sample, yield_t_ha)?)
    }

    /// Full recommendation for one parcel.
    pub fn recommend(&self, request: &ParcelRequest) -> Result<FullRecommendation> {
        let diagnostic = diagnose(&request.sample);
        let mut notes = Vec::new();

        let liming = match self.recommend_lime(&request.sample, request.area_ha) {
            Ok(rec) => Some(rec),
            Err(RecommendationError::InsufficientData(reason)) => {
                warn!(parcel = %request.parcel_id, %reason, "Liming skipped");
                notes.push(format!("Liming not computed: {}", reason));
                None
            }
            Err(other) => return Err(other),
        };

        for (value, nutrient) in [(request.sample.p, "P"), (request.sample.k, "K"), (request.sample.s, "S")] {
            if value.is_none() {
                notes.push(format!("{} not measured: counted as 0 for the doses", nutrient));
            }
        }

        let input = self.adubation_input(&diagnostic, &request.sample, request.yield_t_ha)?;
        let adubation = recommend(&input)?;
        let blend = allocate(&NutrientDemand::from_recommendation(&adubation), &request.blend)?;

        Ok(FullRecommendation {
            parcel_id: request.parcel_id.clone(),
            diagnostic,
            liming,
            adubation,
            blend,
            notes,
        })
    }

    /// Evaluate many parcels in parallel. Results keep the request order.
    pub fn recommend_parcels(&self, requests: &[ParcelRequest]) -> Vec<Result<FullRecommendation>> {
        info!(parcels = requests.len(), "Evaluating parcels");
        requests.par_iter().map(|request| self.recommend(request)).collect()
    }
}
