use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use chrono::Month;
use serde_json::Value;

use crate::scoring::{
    assessment_router, FeatureSchema, FeatureSpec, ModelConfig, ModelMetadata, RawInput,
    RiskEngine, TierThresholds,
};

/// Probability the standard model assigns to `baseline_applicant`.
pub(super) const BASELINE_PROBABILITY: f64 = 0.100_496_503_924_272_19;

pub(super) fn engine() -> RiskEngine {
    RiskEngine::standard().expect("standard model validates")
}

pub(super) fn baseline_applicant() -> RawInput {
    RawInput::new()
        .with_number("age", 35.0)
        .with_number("campaign", 2.0)
        .with_number("pdays", 999.0)
        .with_number("previous", 0.0)
        .with_number("contact_cellular", 1.0)
        .with_number("month_may", 1.0)
        .with_number("default_no", 1.0)
        .with_number("job_technician", 1.0)
        .with_number("marital_married", 1.0)
        .with_number("education_university.degree", 1.0)
        .with_number("housing_no", 1.0)
        .with_number("loan_no", 1.0)
}

pub(super) fn march_applicant() -> RawInput {
    baseline_applicant().with_application_month(Month::March)
}

/// Two-feature engine whose raw score is `10 * up - 10 * down`.
pub(super) fn opposed_engine(decision_threshold: f64) -> RiskEngine {
    let schema = FeatureSchema::new(vec![
        FeatureSpec::numeric("up", 0.0),
        FeatureSpec::numeric("down", 0.0),
    ])
    .expect("schema builds");

    let weights: BTreeMap<String, f64> = [("up".to_string(), 10.0), ("down".to_string(), -10.0)]
        .into_iter()
        .collect();

    RiskEngine::with_schema(
        schema,
        ModelConfig {
            metadata: ModelMetadata::default(),
            intercept: Some(0.0),
            weights,
            tiers: TierThresholds::default(),
            decision_threshold,
        },
    )
    .expect("opposed model validates")
}

pub(super) fn router() -> axum::Router {
    assessment_router(Arc::new(engine()))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
