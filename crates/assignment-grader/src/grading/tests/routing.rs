use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::config::GradingConfig;
use crate::grading::capabilities::CapabilityBundle;
use crate::grading::router::{grading_router, GradingState};

fn app(bundle: CapabilityBundle) -> axum::Router {
    let state = GradingState::new(Arc::new(grader(bundle)), &GradingConfig::default());
    grading_router(state)
}

async fn post_raw(
    app: axum::Router,
    content_type: Option<&str>,
    body: impl Into<Body>,
) -> (StatusCode, Value) {
    let mut request = Request::post("/api/grade");
    if let Some(content_type) = content_type {
        request = request.header(CONTENT_TYPE, content_type);
    }
    let response = app
        .oneshot(request.body(body.into()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

async fn post_json(app: axum::Router, body: Value) -> (StatusCode, Value) {
    post_raw(app, Some("application/json"), body.to_string()).await
}

fn error_message(body: &Value) -> &str {
    body["error"].as_str().expect("error string")
}

#[tokio::test]
async fn grade_returns_full_report() {
    let (status, body) = post_json(
        app(keyword_bundle()),
        json!({ "text": PETS_TEXT, "criteria": [PETS_CRITERION], "max_score": 50 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["max_score"], json!(50.0));
    assert_eq!(body["quality_metrics"]["word_count"], json!(9));
    assert_eq!(body["style_metrics"]["transition_words"], json!(1));
    assert!(body["semantic_analysis"][PETS_CRITERION]["coverage_score"]
        .as_f64()
        .is_some_and(|score| score > 0.3));
    assert!(body["feedback"]["overall_assessment"].is_string());
    assert!(body["final_score"].as_f64().is_some_and(|score| score <= 50.0));
}

#[tokio::test]
async fn missing_max_score_uses_configured_default() {
    let (status, body) = post_json(
        app(CapabilityBundle::builtin()),
        json!({ "text": PETS_TEXT, "criteria": ["pets"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["max_score"], json!(100.0));
}

#[tokio::test]
async fn empty_text_is_rejected() {
    let (status, body) = post_json(
        app(CapabilityBundle::builtin()),
        json!({ "text": "   ", "criteria": ["pets"] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No text provided" }));
}

#[tokio::test]
async fn missing_criteria_are_rejected() {
    let (status, body) = post_json(
        app(CapabilityBundle::builtin()),
        json!({ "text": PETS_TEXT, "criteria": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No valid grading criteria provided" }));
}

#[tokio::test]
async fn non_positive_max_score_is_rejected() {
    let (status, _) = post_json(
        app(CapabilityBundle::builtin()),
        json!({ "text": PETS_TEXT, "criteria": ["pets"], "max_score": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_string_criterion_is_a_json_client_error() {
    let (status, body) = post_json(
        app(CapabilityBundle::builtin()),
        json!({ "text": "Some essay.", "criteria": [1] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).starts_with("Invalid request body:"));
}

#[tokio::test]
async fn unparseable_body_is_a_json_client_error() {
    let (status, body) = post_raw(
        app(CapabilityBundle::builtin()),
        Some("application/json"),
        "{\"text\": \"unterminated",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).starts_with("Invalid request body:"));
}

#[tokio::test]
async fn missing_content_type_is_a_json_client_error() {
    let payload = json!({ "text": PETS_TEXT, "criteria": ["pets"] }).to_string();
    let (status, body) = post_raw(app(CapabilityBundle::builtin()), None, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).starts_with("Invalid request body:"));
}

#[tokio::test]
async fn capabilities_reports_what_is_loaded() {
    let response = app(CapabilityBundle::builtin().without_sentiment())
        .oneshot(
            Request::get("/api/capabilities")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(body["tokenizer"], json!(true));
    assert_eq!(body["embedder"], json!(true));
    assert_eq!(body["sentiment"], json!(false));
}
