//! Caller-boundary validation. Everything here runs before the pipeline;
//! a `GradingError` is a rejection of the request, never an analyzer failure.

use serde::Deserialize;
use tracing::{info, warn};

use super::capabilities::{CapabilityBundle, CapabilityError};
use super::domain::{Criterion, Document, DocumentFormat, NormalizedText};
use super::normalizer::normalize;

/// Characters of normalized text echoed back by document uploads.
pub const TEXT_PREVIEW_CHARS: usize = 800;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradingError {
    #[error("No text provided")]
    EmptyText,
    #[error("No valid grading criteria provided")]
    MissingCriteria,
    #[error("criterion {position} is blank")]
    BlankCriterion { position: usize },
    #[error("max_score must be a positive number, got {0}")]
    InvalidMaxScore(String),
    #[error("Criteria should be plain text, one per line, not JSON")]
    CriteriaLooksLikeJson,
    #[error("No file uploaded")]
    NoDocuments,
    #[error("Invalid request body: {0}")]
    MalformedRequest(String),
    #[error("Malformed upload: {0}")]
    MalformedUpload(String),
    #[error("File type not allowed for {name}. Please upload PDF, TXT, or DOCX files.")]
    UnsupportedFormat { name: String },
    #[error("{name} exceeds the upload limit of {limit} bytes")]
    DocumentTooLarge { name: String, limit: usize },
    #[error("Could not extract text from {name}: {source}")]
    Extraction {
        name: String,
        #[source]
        source: CapabilityError,
    },
    #[error("Could not extract text from {name}")]
    EmptyDocument { name: String },
}

/// JSON body of a text grading request.
#[derive(Debug, Clone, Deserialize)]
pub struct GradeRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub criteria: Vec<String>,
    #[serde(default)]
    pub max_score: Option<f64>,
}

/// A request that passed every precondition of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingJob {
    pub text: NormalizedText,
    pub criteria: Vec<Criterion>,
    pub max_score: f64,
}

impl GradeRequest {
    pub fn validate(self, default_max_score: f64) -> Result<GradingJob, GradingError> {
        let text = normalize(&self.text);
        if text.is_empty() {
            return Err(GradingError::EmptyText);
        }
        let criteria = validate_criteria(self.criteria)?;
        let max_score = validate_max_score(self.max_score.unwrap_or(default_max_score))?;
        Ok(GradingJob {
            text,
            criteria,
            max_score,
        })
    }
}

/// Rejects an empty list or any blank entry; entries are trimmed.
pub fn validate_criteria(criteria: Vec<String>) -> Result<Vec<Criterion>, GradingError> {
    if criteria.is_empty() {
        return Err(GradingError::MissingCriteria);
    }
    criteria
        .into_iter()
        .enumerate()
        .map(|(index, criterion)| {
            let trimmed = criterion.trim();
            if trimmed.is_empty() {
                Err(GradingError::BlankCriterion { position: index + 1 })
            } else {
                Ok(Criterion::new(trimmed))
            }
        })
        .collect()
}

pub fn validate_max_score(max_score: f64) -> Result<f64, GradingError> {
    if max_score.is_finite() && max_score > 0.0 {
        Ok(max_score)
    } else {
        Err(GradingError::InvalidMaxScore(max_score.to_string()))
    }
}

/// Form-field variant; a missing or blank value falls back to the default.
pub fn parse_max_score(raw: Option<&str>, default_max_score: f64) -> Result<f64, GradingError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => validate_max_score(default_max_score),
        Some(value) => value
            .parse::<f64>()
            .map_err(|_| GradingError::InvalidMaxScore(value.to_string()))
            .and_then(validate_max_score),
    }
}

/// One criterion per non-blank line. Text that looks like JSON is refused.
pub fn parse_criteria(text: &str) -> Result<Vec<Criterion>, GradingError> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        warn!("criteria text resembles JSON");
        return Err(GradingError::CriteriaLooksLikeJson);
    }

    let criteria: Vec<Criterion> = trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Criterion::from)
        .collect();
    if criteria.is_empty() {
        warn!("empty criteria received");
        return Err(GradingError::MissingCriteria);
    }
    info!(count = criteria.len(), "parsed criteria");
    Ok(criteria)
}

/// Resolves the declared format from the file name's extension.
pub fn document_format(name: &str) -> Result<DocumentFormat, GradingError> {
    DocumentFormat::from_filename(name).ok_or_else(|| GradingError::UnsupportedFormat {
        name: name.to_string(),
    })
}

/// Extracts and concatenates every document, each followed by a newline.
pub fn extract_documents(
    capabilities: &CapabilityBundle,
    documents: &[Document],
    max_upload_bytes: usize,
) -> Result<String, GradingError> {
    if documents.is_empty() {
        return Err(GradingError::NoDocuments);
    }
    for document in documents {
        if document.bytes.len() > max_upload_bytes {
            return Err(GradingError::DocumentTooLarge {
                name: document.name.clone(),
                limit: max_upload_bytes,
            });
        }
    }

    let mut text = String::new();
    for document in documents {
        let extracted = capabilities
            .extractor()
            .and_then(|extractor| extractor.extract(document))
            .map_err(|source| GradingError::Extraction {
                name: document.name.clone(),
                source,
            })?;
        if extracted.trim().is_empty() {
            return Err(GradingError::EmptyDocument {
                name: document.name.clone(),
            });
        }
        info!(
            document = %document.name,
            format = document.format.label(),
            chars = extracted.chars().count(),
            "extracted document text"
        );
        text.push_str(&extracted);
        text.push('\n');
    }
    Ok(text)
}
