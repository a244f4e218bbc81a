use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::classifier::{RiskClassifier, TierThresholds, DEFAULT_DECISION_THRESHOLD};
use super::model::WeightTable;
use super::schema::FeatureSchema;

/// Descriptive model card carried alongside the weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_records: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_default_rate: Option<f64>,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            name: "custom".to_string(),
            accuracy: None,
            training_records: None,
            base_default_rate: None,
        }
    }
}

/// Unvalidated weight table and thresholds as loaded from an external source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub metadata: ModelMetadata,
    #[serde(default)]
    pub intercept: Option<f64>,
    pub weights: BTreeMap<String, f64>,
    #[serde(default)]
    pub tiers: TierThresholds,
    #[serde(default = "default_decision_threshold")]
    pub decision_threshold: f64,
}

fn default_decision_threshold() -> f64 {
    DEFAULT_DECISION_THRESHOLD
}

const STANDARD_INTERCEPT: f64 = -2.05;

const STANDARD_WEIGHTS: [(&str, f64); 35] = [
    ("age", 0.004),
    ("campaign", 0.045),
    ("pdays", -0.00028),
    ("previous", 0.12),
    ("contact_cellular", 0.438),
    ("month_jan", 0.0),
    ("month_feb", 0.02),
    ("month_mar", 0.198),
    ("month_apr", 0.05),
    ("month_may", -0.12),
    ("month_jun", -0.02),
    ("month_jul", -0.06),
    ("month_aug", -0.04),
    ("month_sep", 0.16),
    ("month_oct", 0.185),
    ("month_nov", -0.05),
    ("month_dec", 0.15),
    ("job_admin.", 0.03),
    ("job_blue-collar", -0.11),
    ("job_management", 0.02),
    ("job_retired", 0.21),
    ("job_services", -0.08),
    ("job_student", 0.26),
    ("job_technician", -0.01),
    ("job_unemployed", 0.09),
    ("marital_married", -0.06),
    ("marital_single", 0.07),
    ("marital_divorced", 0.01),
    ("education_basic.9y", -0.09),
    ("education_high.school", 0.01),
    ("education_professional.course", 0.02),
    ("education_university.degree", 0.06),
    ("default_no", -0.31),
    ("housing_no", -0.04),
    ("loan_no", -0.05),
];

impl ModelConfig {
    /// Built-in coefficients pinned for the standard schema.
    pub fn standard() -> Self {
        Self {
            metadata: ModelMetadata {
                name: "bank-marketing-logit-v1".to_string(),
                accuracy: Some(0.788),
                training_records: Some(41_188),
                base_default_rate: Some(0.113),
            },
            intercept: Some(STANDARD_INTERCEPT),
            weights: STANDARD_WEIGHTS
                .iter()
                .map(|(name, weight)| (name.to_string(), *weight))
                .collect(),
            tiers: TierThresholds::default(),
            decision_threshold: DEFAULT_DECISION_THRESHOLD,
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigurationError> {
        serde_json::from_reader(reader).map_err(ConfigurationError::Parse)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Checks the table against `schema` and splits it into its runtime parts.
    pub(crate) fn validate(
        self,
        schema: &FeatureSchema,
    ) -> Result<(WeightTable, RiskClassifier, ModelMetadata), ConfigurationError> {
        let intercept = self.intercept.ok_or(ConfigurationError::MissingIntercept)?;
        if !intercept.is_finite() {
            return Err(ConfigurationError::NonFiniteWeight {
                feature: "intercept".to_string(),
            });
        }

        for (feature, weight) in &self.weights {
            if !schema.contains(feature) {
                return Err(ConfigurationError::UnknownWeight {
                    feature: feature.clone(),
                });
            }
            if !weight.is_finite() {
                return Err(ConfigurationError::NonFiniteWeight {
                    feature: feature.clone(),
                });
            }
        }

        if let Some(feature) = schema.names().find(|name| !self.weights.contains_key(*name)) {
            return Err(ConfigurationError::MissingWeight {
                feature: feature.to_string(),
            });
        }

        let classifier = RiskClassifier::new(self.tiers, self.decision_threshold)?;
        let table = WeightTable {
            intercept,
            weights: self.weights,
        };

        Ok((table, classifier, self.metadata))
    }
}

/// Weight table or thresholds unusable at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("weight table has no intercept")]
    MissingIntercept,
    #[error("weight for '{feature}' is not a finite number")]
    NonFiniteWeight { feature: String },
    #[error("weight table names '{feature}', which is not in the feature schema")]
    UnknownWeight { feature: String },
    #[error("feature '{feature}' has no weight")]
    MissingWeight { feature: String },
    #[error("feature '{name}' is declared more than once")]
    DuplicateFeature { name: String },
    #[error("{band} tier threshold {value} must lie strictly between 0 and 1")]
    ThresholdOutOfRange { band: &'static str, value: f64 },
    #[error("tier thresholds must increase strictly (medium {medium}, high {high}, very_high {very_high})")]
    NonMonotonicTiers {
        medium: f64,
        high: f64,
        very_high: f64,
    },
    #[error("decision threshold {value} must lie strictly between 0 and 1")]
    DecisionThresholdOutOfRange { value: f64 },
    #[error("failed to read model configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid model configuration: {0}")]
    Parse(#[source] serde_json::Error),
}
