use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::encoder::FeatureVector;

/// Per-feature coefficients plus the intercept of the linear risk model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    pub intercept: f64,
    pub weights: BTreeMap<String, f64>,
}

impl WeightTable {
    pub fn weight(&self, feature: &str) -> Option<f64> {
        self.weights.get(feature).copied()
    }
}

/// Feature vector that does not cover every weighted feature.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("feature vector is missing weighted features: {}", missing.join(", "))]
pub struct SchemaMismatchError {
    pub missing: Vec<String>,
}

/// Linear model over a shared, immutable weight table.
#[derive(Debug, Clone)]
pub struct LinearRiskModel {
    table: Arc<WeightTable>,
}

impl LinearRiskModel {
    pub fn new(table: WeightTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &WeightTable {
        &self.table
    }

    /// Raw, unbounded score: `intercept + sum(weight[f] * vector[f])`.
    pub fn score(&self, vector: &FeatureVector) -> Result<f64, SchemaMismatchError> {
        let mut raw = self.table.intercept;
        let mut missing = Vec::new();

        for (feature, weight) in &self.table.weights {
            match vector.get(feature) {
                Some(value) => raw += weight * value,
                None => missing.push(feature.clone()),
            }
        }

        if missing.is_empty() {
            Ok(raw)
        } else {
            Err(SchemaMismatchError { missing })
        }
    }
}
