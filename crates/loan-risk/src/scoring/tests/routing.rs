use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn assess_route_returns_score_result() {
    let payload = serde_json::to_value(baseline_applicant()).unwrap();

    let response = router()
        .oneshot(post_json("/api/v1/assessments", &payload))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body.get("risk_level"), Some(&json!("LOW")));
    assert_eq!(body.get("recommendation"), Some(&json!("APPROVE")));
    let probability = body
        .get("probability")
        .and_then(Value::as_f64)
        .expect("probability present");
    assert!((probability - BASELINE_PROBABILITY).abs() < 1e-12);
}

#[tokio::test]
async fn assess_route_rejects_unknown_features() {
    let payload = json!({ "age": 35, "not_a_real_feature": 1.0 });

    let response = router()
        .oneshot(post_json("/api/v1/assessments", &payload))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("not_a_real_feature"));
}

#[tokio::test]
async fn assess_handler_rejects_text_values() {
    let raw = serde_json::from_value(json!({ "age": "thirty-five" })).unwrap();

    let response = crate::scoring::router::assess_handler(
        State(Arc::new(engine())),
        axum::Json(raw),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn batch_route_summarizes_outcomes() {
    let payload = json!({
        "applications": [
            { "application_id": "A-1", "features": baseline_applicant() },
            { "features": { "age": 60, "contact_cellular": true, "previous": 40 } },
            { "application_id": "A-3", "features": { "agee": 40 } }
        ]
    });

    let response = router()
        .oneshot(post_json("/api/v1/assessments/batch", &payload))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["approved"], 1);
    assert_eq!(body["rejected"], 1);
    assert_eq!(body["failed"], 1);

    let results = body["results"].as_array().expect("results array");
    assert_eq!(results[0]["application_id"], "A-1");
    assert_eq!(results[1]["application_id"], "row-2");
    assert_eq!(results[1]["recommendation"], "REJECT");
    assert!(results[2]["error"].as_str().unwrap_or_default().contains("agee"));
}

#[tokio::test]
async fn model_route_reports_weight_table() {
    let response = router()
        .oneshot(
            Request::get("/api/v1/model")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["weights"].as_array().map(Vec::len), Some(35));
    assert_eq!(body["intercept"], json!(-2.05));
    assert_eq!(body["tiers"]["high"], json!(0.5));
    assert_eq!(body["metadata"]["training_records"], json!(41_188));
}
