mod rubric;

pub use rubric::{
    Band, Bound, Dimension, Metric, RubricRule, COVERAGE_FALLBACK, STANDARD_RUBRIC,
};

use serde::Serialize;
use tracing::{info, warn};

use super::analysis::round_to;
use super::domain::{QualityMetrics, ScoreBreakdown, SemanticCoverage, StyleMetrics};

/// Analyzer outputs the rubric reads.
pub struct ScoringInputs<'a> {
    pub quality: &'a QualityMetrics,
    pub style: &'a StyleMetrics,
    pub coverage: &'a SemanticCoverage,
}

/// Points one rubric rule contributed, kept for audit logging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub dimension: Dimension,
    pub metric: Metric,
    pub value: Option<f64>,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreOutcome {
    pub breakdown: ScoreBreakdown,
    pub final_score: f64,
    pub percentage: f64,
    pub components: Vec<ScoreComponent>,
}

/// Stateless scorer that applies a rubric table to analyzer outputs.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    rubric: &'static [RubricRule],
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(STANDARD_RUBRIC)
    }
}

impl ScoringEngine {
    pub fn new(rubric: &'static [RubricRule]) -> Self {
        Self { rubric }
    }

    pub fn score(&self, inputs: &ScoringInputs<'_>, max_score: f64) -> ScoreOutcome {
        let mut components = Vec::with_capacity(self.rubric.len());
        for rule in self.rubric {
            let value = metric_value(rule.metric, inputs);
            let points = match value {
                Some(value) => rule.award(value),
                None => {
                    warn!(metric = ?rule.metric, "metric unknown, using fallback points");
                    fallback_points(rule.metric)
                }
            };
            components.push(ScoreComponent {
                dimension: rule.dimension,
                metric: rule.metric,
                value,
                points,
            });
        }

        let dimension_total = |dimension: Dimension| -> u32 {
            let raw: u32 = components
                .iter()
                .filter(|component| component.dimension == dimension)
                .map(|component| component.points)
                .sum();
            raw.min(dimension.ceiling())
        };
        let breakdown = ScoreBreakdown {
            content_quality: dimension_total(Dimension::ContentQuality),
            writing_style: dimension_total(Dimension::WritingStyle),
            criteria_coverage: dimension_total(Dimension::CriteriaCoverage),
            technical_accuracy: dimension_total(Dimension::TechnicalAccuracy),
        };

        let total = f64::from(breakdown.total());
        let final_score = round_to(total, 1).min(max_score).max(0.0);
        let percentage = if max_score > 0.0 {
            round_to(final_score / max_score * 100.0, 1)
        } else {
            0.0
        };

        info!(
            total = breakdown.total(),
            final_score,
            max_score,
            "score calculated"
        );
        ScoreOutcome {
            breakdown,
            final_score,
            percentage,
            components,
        }
    }
}

fn metric_value(metric: Metric, inputs: &ScoringInputs<'_>) -> Option<f64> {
    match metric {
        Metric::WordCount => Some(inputs.quality.word_count as f64),
        Metric::ReadabilityScore => Some(inputs.quality.readability_score),
        Metric::ContentLexicalDiversity => Some(inputs.style.lexical_diversity),
        Metric::TransitionWords => Some(inputs.style.transition_words as f64),
        Metric::PassiveVoiceCount => Some(inputs.style.passive_voice_count as f64),
        Metric::AverageCoverage => inputs.coverage.average_coverage(),
        Metric::GradeLevel => Some(inputs.quality.grade_level),
    }
}

fn fallback_points(metric: Metric) -> u32 {
    match metric {
        Metric::AverageCoverage => COVERAGE_FALLBACK,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::domain::{CoverageEntry, Criterion, CriterionCoverage};

    fn coverage(scores: &[f64]) -> SemanticCoverage {
        SemanticCoverage::new(
            scores
                .iter()
                .enumerate()
                .map(|(index, &score)| CriterionCoverage {
                    criterion: Criterion::new(format!("criterion {index}")),
                    entry: CoverageEntry {
                        max_similarity: score,
                        avg_similarity: score,
                        relevant_sentences: Vec::new(),
                        coverage_score: score,
                    },
                })
                .collect(),
        )
    }

    fn strong_quality() -> QualityMetrics {
        QualityMetrics {
            word_count: 1200,
            readability_score: 85.0,
            grade_level: 20.0,
            ..QualityMetrics::default()
        }
    }

    fn strong_style() -> StyleMetrics {
        StyleMetrics {
            lexical_diversity: 0.75,
            transition_words: 10,
            passive_voice_count: 0,
            ..StyleMetrics::default()
        }
    }

    fn score(
        quality: &QualityMetrics,
        style: &StyleMetrics,
        coverage: &SemanticCoverage,
        max_score: f64,
    ) -> ScoreOutcome {
        ScoringEngine::default().score(
            &ScoringInputs {
                quality,
                style,
                coverage,
            },
            max_score,
        )
    }

    #[test]
    fn dimensions_are_capped_at_their_ceilings() {
        let outcome = score(&strong_quality(), &strong_style(), &coverage(&[0.95]), 100.0);
        assert_eq!(outcome.breakdown.content_quality, 25);
        assert_eq!(outcome.breakdown.writing_style, 30);
        assert_eq!(outcome.breakdown.criteria_coverage, 25);
        assert_eq!(outcome.breakdown.technical_accuracy, 0);
        assert_eq!(outcome.final_score, 80.0);
        assert_eq!(outcome.percentage, 80.0);
    }

    #[test]
    fn final_score_is_clamped_to_max_score() {
        let outcome = score(&strong_quality(), &strong_style(), &coverage(&[0.95]), 50.0);
        assert_eq!(outcome.breakdown.total(), 80);
        assert_eq!(outcome.final_score, 50.0);
        assert_eq!(outcome.percentage, 100.0);
    }

    #[test]
    fn fractional_max_score_is_not_exceeded_by_rounding() {
        let outcome = score(&strong_quality(), &strong_style(), &coverage(&[0.95]), 10.06);
        assert_eq!(outcome.final_score, 10.06);
        assert!(outcome.percentage <= 100.0);
        assert_eq!(outcome.percentage, 100.0);
    }

    #[test]
    fn unknown_coverage_uses_fallback() {
        let outcome = score(
            &QualityMetrics::default(),
            &StyleMetrics::default(),
            &SemanticCoverage::unknown(),
            100.0,
        );
        assert_eq!(outcome.breakdown.criteria_coverage, COVERAGE_FALLBACK);
        let coverage_component = outcome
            .components
            .iter()
            .find(|component| component.metric == Metric::AverageCoverage)
            .expect("coverage component");
        assert_eq!(coverage_component.value, None);
    }

    #[test]
    fn empty_metrics_score_only_defaults() {
        let outcome = score(
            &QualityMetrics::default(),
            &StyleMetrics::default(),
            &SemanticCoverage::unknown(),
            100.0,
        );
        // passive voice 0 -> 8, grade level 0 -> 4, coverage fallback 5
        assert_eq!(outcome.breakdown.writing_style, 8);
        assert_eq!(outcome.breakdown.technical_accuracy, 4);
        assert_eq!(outcome.final_score, 17.0);
        assert_eq!(outcome.percentage, 17.0);
    }

    #[test]
    fn coverage_is_averaged_over_all_entries() {
        let outcome = score(
            &QualityMetrics::default(),
            &StyleMetrics::default(),
            &coverage(&[0.9, 0.2]),
            100.0,
        );
        // mean 0.55 -> 15
        assert_eq!(outcome.breakdown.criteria_coverage, 15);
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        let outcome = score(
            &QualityMetrics::default(),
            &StyleMetrics::default(),
            &SemanticCoverage::unknown(),
            30.0,
        );
        assert_eq!(outcome.final_score, 17.0);
        assert_eq!(outcome.percentage, 56.7);
    }
}
