use crate::infra::{resolve_format, AppState};
use assignment_grader::error::AppError;
use assignment_grader::grading::intake::{extract_documents, parse_criteria, parse_max_score};
use assignment_grader::grading::{
    grading_router, normalize, Document, GradeReport, GradingError, GradingJob, GradingState,
    TEXT_PREVIEW_CHARS,
};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::info;

/// Allowance for multipart framing and the text fields around the files.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Debug, Serialize)]
pub(crate) struct DocumentGradeResponse {
    #[serde(flatten)]
    pub(crate) report: GradeReport,
    pub(crate) filenames: Vec<String>,
    pub(crate) text_preview: String,
    pub(crate) timestamp: DateTime<Utc>,
}

pub(crate) fn with_grading_routes(state: GradingState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES);
    let uploads = Router::new()
        .route(
            "/api/grade/documents",
            axum::routing::post(grade_documents_endpoint),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state.clone());

    grading_router(state)
        .merge(uploads)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Default)]
struct UploadForm {
    documents: Vec<Document>,
    criteria: Option<String>,
    max_score: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, GradingError> {
    let malformed = |err: axum::extract::multipart::MultipartError| {
        GradingError::MalformedUpload(err.body_text())
    };
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match name.as_str() {
            "assignment_file" => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let format = resolve_format(&file_name, field.content_type())?;
                let bytes = field.bytes().await.map_err(malformed)?;
                form.documents.push(Document {
                    name: file_name,
                    format,
                    bytes: bytes.to_vec(),
                });
            }
            "criteria" => form.criteria = Some(field.text().await.map_err(malformed)?),
            "max_score" => form.max_score = Some(field.text().await.map_err(malformed)?),
            _ => {}
        }
    }
    Ok(form)
}

pub(crate) async fn grade_documents_endpoint(
    State(state): State<GradingState>,
    multipart: Multipart,
) -> Result<Json<DocumentGradeResponse>, AppError> {
    let form = read_upload_form(multipart).await?;
    if form.documents.is_empty() {
        return Err(GradingError::NoDocuments.into());
    }
    let criteria = parse_criteria(form.criteria.as_deref().unwrap_or_default())?;
    let max_score = parse_max_score(form.max_score.as_deref(), state.default_max_score)?;

    let extracted = extract_documents(
        state.grader.capabilities(),
        &form.documents,
        state.max_upload_bytes,
    )?;
    let text = normalize(&extracted);
    if text.is_empty() {
        return Err(GradingError::EmptyText.into());
    }

    let filenames: Vec<String> = form
        .documents
        .into_iter()
        .map(|document| document.name)
        .collect();
    info!(files = ?filenames, criteria = criteria.len(), "grading uploaded documents");
    let text_preview = text.preview(TEXT_PREVIEW_CHARS);
    let report = state
        .grader
        .grade_concurrent(GradingJob {
            text,
            criteria,
            max_score,
        })
        .await;

    Ok(Json(DocumentGradeResponse {
        report,
        filenames,
        text_preview,
        timestamp: Utc::now(),
    }))
}
