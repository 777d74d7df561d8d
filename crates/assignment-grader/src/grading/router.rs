use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};

use super::capabilities::CapabilityStatus;
use super::domain::GradeReport;
use super::intake::{GradeRequest, GradingError};
use super::pipeline::Grader;
use crate::config::GradingConfig;
use crate::error::AppError;

/// Shared handler state: the grader plus the request limits it is served with.
#[derive(Debug, Clone)]
pub struct GradingState {
    pub grader: Arc<Grader>,
    pub default_max_score: f64,
    pub max_upload_bytes: usize,
}

impl GradingState {
    pub fn new(grader: Arc<Grader>, config: &GradingConfig) -> Self {
        Self {
            grader,
            default_max_score: config.default_max_score,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Router exposing JSON grading and capability status.
pub fn grading_router(state: GradingState) -> Router {
    Router::new()
        .route("/api/grade", post(grade_handler))
        .route("/api/capabilities", get(capabilities_handler))
        .with_state(state)
}

pub(crate) async fn grade_handler(
    State(state): State<GradingState>,
    payload: Result<Json<GradeRequest>, JsonRejection>,
) -> Result<Json<GradeReport>, AppError> {
    let Json(request) =
        payload.map_err(|rejection| GradingError::MalformedRequest(rejection.body_text()))?;
    let job = request.validate(state.default_max_score)?;
    let report = state.grader.grade_concurrent(job).await;
    Ok(Json(report))
}

pub(crate) async fn capabilities_handler(
    State(state): State<GradingState>,
) -> Json<CapabilityStatus> {
    Json(state.grader.capabilities().status())
}
