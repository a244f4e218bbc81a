//! Loan default risk scoring.
//!
//! A single synchronous pipeline: raw applicant attributes are encoded against a closed
//! feature schema, scored by a linear model, squashed into a probability, and bucketed
//! into a risk tier and an approve/reject recommendation. The engine is immutable once
//! built and can be shared across threads behind an `Arc`.

pub mod batch;
pub mod calibration;
pub mod classifier;
pub mod config;
pub mod encoder;
pub mod model;
pub mod router;
pub mod schema;

#[cfg(test)]
mod tests;

pub use batch::{
    read_applications, read_applications_from_path, BatchApplication, BatchError, BatchOutcome,
};
pub use calibration::calibrate;
pub use classifier::{Recommendation, RiskClassifier, RiskLevel, TierThresholds};
pub use config::{ConfigurationError, ModelConfig, ModelMetadata};
pub use encoder::{encode, FeatureVector, InvalidFeatureError, RawInput};
pub use model::{LinearRiskModel, SchemaMismatchError, WeightTable};
pub use router::assessment_router;
pub use schema::{month_feature, FeatureKind, FeatureSchema, FeatureSpec};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a single assessment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub probability: f64,
    pub risk_level: RiskLevel,
    pub recommendation: Recommendation,
}

/// Failure of a single `assess` call. No partial result accompanies it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    InvalidFeature(#[from] InvalidFeatureError),
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatchError),
    #[error("raw risk score is undefined for this input")]
    UndefinedScore,
}

/// Validated schema, weight table and thresholds, fixed for the engine's lifetime.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    schema: Arc<FeatureSchema>,
    model: LinearRiskModel,
    classifier: RiskClassifier,
    metadata: ModelMetadata,
}

impl RiskEngine {
    pub fn standard() -> Result<Self, ConfigurationError> {
        Self::from_config(ModelConfig::standard())
    }

    pub fn from_config(config: ModelConfig) -> Result<Self, ConfigurationError> {
        Self::with_schema(FeatureSchema::standard(), config)
    }

    pub fn with_schema(
        schema: FeatureSchema,
        config: ModelConfig,
    ) -> Result<Self, ConfigurationError> {
        let (table, classifier, metadata) = config.validate(&schema)?;

        info!(
            model = %metadata.name,
            features = schema.len(),
            decision_threshold = classifier.decision_threshold(),
            "risk model loaded"
        );

        Ok(Self {
            schema: Arc::new(schema),
            model: LinearRiskModel::new(table),
            classifier,
            metadata,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn model(&self) -> &LinearRiskModel {
        &self.model
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn encode(&self, raw: &RawInput) -> Result<FeatureVector, InvalidFeatureError> {
        encode(&self.schema, raw)
    }

    /// Scores an already encoded vector; used by `assess` and by callers that build
    /// vectors themselves.
    pub fn score_vector(&self, vector: &FeatureVector) -> Result<ScoreResult, AssessmentError> {
        let raw = self.model.score(vector)?;
        if raw.is_nan() {
            return Err(AssessmentError::UndefinedScore);
        }

        let probability = calibrate(raw);
        let (risk_level, recommendation) = self.classifier.classify(probability);

        Ok(ScoreResult {
            probability,
            risk_level,
            recommendation,
        })
    }

    pub fn assess(&self, raw: &RawInput) -> Result<ScoreResult, AssessmentError> {
        let vector = self.encode(raw)?;
        let result = self.score_vector(&vector)?;

        debug!(
            probability = result.probability,
            risk_level = ?result.risk_level,
            recommendation = ?result.recommendation,
            "application assessed"
        );

        Ok(result)
    }

    /// Scores every application independently; one bad row never affects another.
    pub fn assess_batch(&self, applications: &[BatchApplication]) -> Vec<BatchOutcome> {
        applications
            .iter()
            .map(|application| BatchOutcome {
                application_id: application.application_id.clone(),
                outcome: self.assess(&application.features),
            })
            .collect()
    }

    pub fn weight_report(&self) -> WeightReport {
        let table = self.model.table();
        let weights = self
            .schema
            .iter()
            .map(|spec| FeatureWeight {
                feature: spec.name.clone(),
                kind: spec.kind,
                default: spec.default,
                weight: table.weight(&spec.name).unwrap_or_default(),
            })
            .collect();

        WeightReport {
            metadata: self.metadata.clone(),
            intercept: table.intercept,
            weights,
            tiers: self.classifier.tiers(),
            decision_threshold: self.classifier.decision_threshold(),
        }
    }
}

/// One schema feature with its coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub feature: String,
    pub kind: FeatureKind,
    pub default: f64,
    pub weight: f64,
}

/// The fixed coefficient table and thresholds, in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightReport {
    pub metadata: ModelMetadata,
    pub intercept: f64,
    pub weights: Vec<FeatureWeight>,
    pub tiers: TierThresholds,
    pub decision_threshold: f64,
}

impl WeightReport {
    /// Features with the largest absolute weight first; ties keep schema order.
    pub fn top_factors(&self, limit: usize) -> Vec<&FeatureWeight> {
        let mut ranked: Vec<&FeatureWeight> = self.weights.iter().collect();
        ranked.sort_by(|left, right| right.weight.abs().total_cmp(&left.weight.abs()));
        ranked.truncate(limit);
        ranked
    }
}
