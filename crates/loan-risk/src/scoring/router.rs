use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use super::batch::{BatchApplication, BatchOutcomeView};
use super::encoder::RawInput;
use super::{AssessmentError, Recommendation, RiskEngine};

/// Router builder exposing the scoring engine over HTTP.
pub fn assessment_router(engine: Arc<RiskEngine>) -> Router {
    Router::new()
        .route("/api/v1/assessments", post(assess_handler))
        .route("/api/v1/assessments/batch", post(batch_handler))
        .route("/api/v1/model", get(model_handler))
        .with_state(engine)
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub applications: Vec<BatchApplication>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub approved: usize,
    pub rejected: usize,
    pub failed: usize,
    pub results: Vec<BatchOutcomeView>,
}

pub(crate) async fn assess_handler(
    State(engine): State<Arc<RiskEngine>>,
    Json(raw): Json<RawInput>,
) -> Response {
    match engine.assess(&raw) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(AssessmentError::InvalidFeature(err)) => {
            warn!(error = %err, "rejected assessment input");
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(other) => {
            error!(error = %other, "assessment failed");
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn batch_handler(
    State(engine): State<Arc<RiskEngine>>,
    Json(request): Json<BatchRequest>,
) -> Json<BatchResponse> {
    let mut applications = request.applications;
    for (index, application) in applications.iter_mut().enumerate() {
        if application.application_id.is_empty() {
            application.application_id = format!("row-{}", index + 1);
        }
    }

    let outcomes = engine.assess_batch(&applications);
    let mut response = BatchResponse {
        approved: 0,
        rejected: 0,
        failed: 0,
        results: Vec::with_capacity(outcomes.len()),
    };

    for outcome in &outcomes {
        match &outcome.outcome {
            Ok(result) if result.recommendation == Recommendation::Approve => {
                response.approved += 1
            }
            Ok(_) => response.rejected += 1,
            Err(err) => {
                warn!(application_id = %outcome.application_id, error = %err, "batch row rejected");
                response.failed += 1
            }
        }
        response.results.push(outcome.view());
    }

    Json(response)
}

pub(crate) async fn model_handler(State(engine): State<Arc<RiskEngine>>) -> impl IntoResponse {
    Json(engine.weight_report())
}
