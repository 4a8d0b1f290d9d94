//! Recommend liming and fertilization for soil samples in a JSON file
//!
//! Usage: recommend_sample <samples.json> [config.json]
//!
//! The samples file holds one object or an array of objects with soil fields
//! (numbers or strings, decimal comma accepted), plus `yield_t_ha`, optional
//! `parcel_id`, `area_ha` and `blend`. Results are printed as JSON.

use anyhow::{Context, Result};
use serde_json::Value;
use soy_recommender_rust::blend::BlendStrategy;
use soy_recommender_rust::{get_f64, ParcelRequest, RecommendationConfig, Recommender, SoilSample};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn parse_request(index: usize, value: Value) -> Result<ParcelRequest> {
    let fields: HashMap<String, Value> = serde_json::from_value(value)
        .with_context(|| format!("Sample {} is not a JSON object", index))?;

    let yield_t_ha = match get_f64(&fields, "yield_t_ha") {
        Some(y) => y,
        None => anyhow::bail!("Sample {} is missing yield_t_ha", index),
    };
    let blend = match fields.get("blend") {
        Some(b) => serde_json::from_value::<BlendStrategy>(b.clone())
            .with_context(|| format!("Invalid blend strategy in sample {}", index))?,
        None => BlendStrategy::SoftwareChoice,
    };
    let parcel_id = fields
        .get("parcel_id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("sample_{}", index + 1));

    Ok(ParcelRequest {
        parcel_id,
        sample: SoilSample::from_fields(&fields),
        yield_t_ha,
        area_ha: get_f64(&fields, "area_ha"),
        blend,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soy_recommender_rust=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        anyhow::bail!("Usage: {} <samples.json> [config.json]", args[0]);
    }

    let recommender = match args.get(2) {
        Some(config_path) => Recommender::from_config_file(Path::new(config_path))?,
        None => Recommender::new(RecommendationConfig::default())?,
    };

    let contents = fs::read_to_string(&args[1])
        .with_context(|| format!("Failed to read samples file: {}", args[1]))?;
    let parsed: Value = serde_json::from_str(&contents)
        .with_context(|| "Failed to parse samples JSON")?;

    let values = match parsed {
        Value::Array(items) => items,
        single => vec![single],
    };
    let requests = values
        .into_iter()
        .enumerate()
        .map(|(i, v)| parse_request(i, v))
        .collect::<Result<Vec<_>>>()?;

    let mut output = Vec::with_capacity(requests.len());
    for (request, result) in requests.iter().zip(recommender.recommend_parcels(&requests)) {
        match result {
            Ok(full) => {
                for line in full.adubation.summary_lines() {
                    tracing::info!(parcel = %request.parcel_id, "{}", line);
                }
                output.push(serde_json::to_value(&full)?);
            }
            Err(e) => {
                tracing::error!(parcel = %request.parcel_id, error = %e, "Recommendation failed");
                output.push(serde_json::json!({
                    "parcel_id": request.parcel_id,
                    "error": e.to_string(),
                }));
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
