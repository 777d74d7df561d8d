//! Assignment grading: intake, normalization, analysis, feedback, and scoring.

pub mod analysis;
pub mod capabilities;
pub mod domain;
pub mod feedback;
pub mod intake;
pub(crate) mod lexicon;
pub mod normalizer;
pub mod pipeline;
pub mod router;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use capabilities::{CapabilityBundle, CapabilityError, CapabilityKind, CapabilityStatus};
pub use domain::{
    CoverageEntry, Criterion, Document, DocumentFormat, FeedbackReport, GradeReport,
    NormalizedText, QualityMetrics, ScoreBreakdown, SemanticCoverage, SentimentProfile,
    StyleMetrics, Tone, WordFrequency,
};
pub use intake::{GradeRequest, GradingError, GradingJob, TEXT_PREVIEW_CHARS};
pub use normalizer::normalize;
pub use pipeline::{Analyses, Grader};
pub use router::{grading_router, GradingState};
