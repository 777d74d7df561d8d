//! Request-scoped grading: normalize, run the four analyzers, then derive
//! feedback and the score from their outputs.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::analysis::{analyze_coverage, analyze_quality, analyze_style, analyze_tone};
use super::capabilities::CapabilityBundle;
use super::domain::{
    Criterion, GradeReport, NormalizedText, QualityMetrics, SemanticCoverage, SentimentProfile,
    StyleMetrics,
};
use super::feedback::{synthesize, FeedbackSignals};
use super::intake::GradingJob;
use super::normalizer::normalize;
use super::scoring::{ScoringEngine, ScoringInputs};
use crate::config::GradingConfig;

const DEFAULT_ANALYZER_TIMEOUT: Duration = Duration::from_secs(30);

const RUNNING: u8 = 0;
const FINISHED: u8 = 1;
const ABANDONED: u8 = 2;

/// Outputs of the four independent analyzers for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Analyses {
    pub quality: QualityMetrics,
    pub style: StyleMetrics,
    pub coverage: SemanticCoverage,
    pub sentiment: Option<SentimentProfile>,
}

/// Grading pipeline over a shared, read-only capability bundle.
#[derive(Debug, Clone)]
pub struct Grader {
    capabilities: Arc<CapabilityBundle>,
    engine: ScoringEngine,
    analyzer_timeout: Duration,
    abandoned: Arc<AtomicUsize>,
}

/// Lives inside a blocking analyzer task; reports when a task the caller
/// stopped waiting on finally releases its thread, including by panic.
struct InflightAnalyzer {
    analyzer: &'static str,
    state: Arc<AtomicU8>,
    backlog: Arc<AtomicUsize>,
}

impl Drop for InflightAnalyzer {
    fn drop(&mut self) {
        let finished = self
            .state
            .compare_exchange(RUNNING, FINISHED, Ordering::AcqRel, Ordering::Acquire);
        if finished.is_err() {
            let remaining = self.backlog.fetch_sub(1, Ordering::AcqRel).saturating_sub(1);
            debug!(
                analyzer = self.analyzer,
                remaining, "abandoned analyzer finished"
            );
        }
    }
}

impl Grader {
    pub fn new(capabilities: Arc<CapabilityBundle>) -> Self {
        Self {
            capabilities,
            engine: ScoringEngine::default(),
            analyzer_timeout: DEFAULT_ANALYZER_TIMEOUT,
            abandoned: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn from_config(config: &GradingConfig) -> Self {
        Self::new(Arc::new(CapabilityBundle::from_config(config)))
            .with_analyzer_timeout(config.analyzer_timeout)
    }

    pub fn with_analyzer_timeout(mut self, timeout: Duration) -> Self {
        self.analyzer_timeout = timeout;
        self
    }

    pub fn capabilities(&self) -> &CapabilityBundle {
        &self.capabilities
    }

    /// Timed-out analyzer tasks still holding a blocking thread.
    pub fn abandoned_analyzers(&self) -> usize {
        self.abandoned.load(Ordering::Acquire)
    }

    /// Grades raw text. Never fails; degenerate input yields default metrics.
    pub fn grade(&self, text: &str, criteria: &[Criterion], max_score: f64) -> GradeReport {
        self.grade_normalized(&normalize(text), criteria, max_score)
    }

    pub fn grade_normalized(
        &self,
        text: &NormalizedText,
        criteria: &[Criterion],
        max_score: f64,
    ) -> GradeReport {
        info!(chars = text.as_str().len(), criteria = criteria.len(), "grading started");
        let capabilities = self.capabilities.as_ref();
        let analyses = Analyses {
            quality: analyze_quality(capabilities, text),
            style: analyze_style(capabilities, text),
            coverage: analyze_coverage(capabilities, text, criteria),
            sentiment: analyze_tone(capabilities, text),
        };
        self.assemble(analyses, criteria, max_score)
    }

    /// Runs the analyzers concurrently on the blocking pool. An analyzer that
    /// panics or exceeds the timeout contributes its default output.
    pub async fn grade_concurrent(&self, job: GradingJob) -> GradeReport {
        let GradingJob {
            text,
            criteria,
            max_score,
        } = job;
        info!(
            chars = text.as_str().len(),
            criteria = criteria.len(),
            "concurrent grading started"
        );
        let text = Arc::new(text);
        let shared_criteria = Arc::new(criteria);

        let quality = {
            let (capabilities, text) = (self.capabilities.clone(), text.clone());
            self.run_analyzer("quality", move || analyze_quality(&capabilities, &text))
        };
        let style = {
            let (capabilities, text) = (self.capabilities.clone(), text.clone());
            self.run_analyzer("style", move || analyze_style(&capabilities, &text))
        };
        let coverage = {
            let (capabilities, text) = (self.capabilities.clone(), text.clone());
            let criteria = shared_criteria.clone();
            self.run_analyzer("semantic", move || {
                analyze_coverage(&capabilities, &text, &criteria)
            })
        };
        let sentiment = {
            let (capabilities, text) = (self.capabilities.clone(), text.clone());
            self.run_analyzer("sentiment", move || analyze_tone(&capabilities, &text))
        };

        let (quality, style, coverage, sentiment) =
            tokio::join!(quality, style, coverage, sentiment);
        let analyses = Analyses {
            quality,
            style,
            coverage,
            sentiment,
        };
        self.assemble(analyses, &shared_criteria, max_score)
    }

    async fn run_analyzer<T, F>(&self, analyzer: &'static str, work: F) -> T
    where
        F: FnOnce() -> T + Send + 'static,
        T: Default + Send + 'static,
    {
        let state = Arc::new(AtomicU8::new(RUNNING));
        let inflight = InflightAnalyzer {
            analyzer,
            state: Arc::clone(&state),
            backlog: Arc::clone(&self.abandoned),
        };
        let mut task = tokio::task::spawn_blocking(move || {
            let _inflight = inflight;
            work()
        });

        let joined = match tokio::time::timeout(self.analyzer_timeout, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                self.abandoned.fetch_add(1, Ordering::AcqRel);
                let abandoned =
                    state.compare_exchange(RUNNING, ABANDONED, Ordering::AcqRel, Ordering::Acquire);
                if abandoned.is_ok() {
                    warn!(
                        analyzer,
                        timeout_ms = self.analyzer_timeout.as_millis() as u64,
                        backlog = self.abandoned_analyzers(),
                        "analyzer timed out; using defaults"
                    );
                    return T::default();
                }
                // Finished right at the deadline; the result is ready.
                self.abandoned.fetch_sub(1, Ordering::AcqRel);
                task.await
            }
        };

        match joined {
            Ok(output) => output,
            Err(err) => {
                warn!(analyzer, error = %err, "analyzer task failed; using defaults");
                T::default()
            }
        }
    }

    fn assemble(&self, analyses: Analyses, criteria: &[Criterion], max_score: f64) -> GradeReport {
        let Analyses {
            quality,
            style,
            coverage,
            sentiment,
        } = analyses;

        let feedback = synthesize(&FeedbackSignals {
            quality: &quality,
            style: &style,
            coverage: &coverage,
            sentiment: sentiment.as_ref(),
        });
        let outcome = self.engine.score(
            &ScoringInputs {
                quality: &quality,
                style: &style,
                coverage: &coverage,
            },
            max_score,
        );
        debug!(components = ?outcome.components, "score components");
        info!(
            final_score = outcome.final_score,
            percentage = outcome.percentage,
            "grading complete"
        );

        GradeReport {
            final_score: outcome.final_score,
            max_score,
            percentage: outcome.percentage,
            score_breakdown: outcome.breakdown,
            quality_metrics: quality,
            style_metrics: style,
            semantic_analysis: coverage,
            sentiment_analysis: sentiment,
            feedback,
            criteria: criteria.to_vec(),
        }
    }
}
