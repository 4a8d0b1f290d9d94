//! Error types for the recommendation engine
//!
//! Classifiers and dose arithmetic are total and never fail. Only missing
//! required inputs, unsupported configuration values, and liming runs with no
//! usable method surface as errors. Unmet fertilizer demand is reported in
//! the blend result, not here.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecommendationError {
    /// A required value was missing or could not be parsed.
    #[error("invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// A configuration value outside the supported set (target pH, product
    /// code, PRNT, cultivation cycle, formula grade).
    #[error("unsupported {parameter}: {value}")]
    UnsupportedConfiguration { parameter: String, value: String },

    /// No liming method has the inputs it needs.
    #[error("insufficient data: {0}")]
    InsufficientData(String),
}

impl RecommendationError {
    pub fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        RecommendationError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(parameter: &str, value: impl ToString) -> Self {
        RecommendationError::UnsupportedConfiguration {
            parameter: parameter.to_string(),
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecommendationError>;
