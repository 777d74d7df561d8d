//! Deterministic feedback from the four analyzer outputs.
//!
//! Rules fire in table order; the verdict compares how many strengths and
//! weaknesses were collected.

use tracing::info;

use super::domain::{
    FeedbackReport, QualityMetrics, SemanticCoverage, SentimentProfile, StyleMetrics,
};

pub const STRONG_VERDICT: &str =
    "This is a strong assignment with clear strengths that outweigh the areas for improvement.";
pub const WEAK_VERDICT: &str =
    "This assignment has potential but requires significant improvement in several areas.";
pub const BALANCED_VERDICT: &str =
    "This assignment shows balanced performance with equal strengths and areas for development.";

const WELL_COVERED: f64 = 0.7;
const POORLY_COVERED: f64 = 0.4;
const NAMED_CRITERIA: usize = 3;

/// Everything a rule may look at.
pub struct FeedbackSignals<'a> {
    pub quality: &'a QualityMetrics,
    pub style: &'a StyleMetrics,
    pub coverage: &'a SemanticCoverage,
    pub sentiment: Option<&'a SentimentProfile>,
}

/// One fixed-text rule; when the predicate holds each present message is appended.
struct FeedbackRule {
    applies: fn(&FeedbackSignals<'_>) -> bool,
    strength: Option<&'static str>,
    weakness: Option<&'static str>,
    suggestion: Option<&'static str>,
}

const METRIC_RULES: &[FeedbackRule] = &[
    FeedbackRule {
        applies: |s| s.quality.word_count >= 300,
        strength: Some("Good length and depth of content"),
        weakness: None,
        suggestion: None,
    },
    FeedbackRule {
        applies: |s| s.quality.readability_score > 50.0,
        strength: Some("Clear and readable writing style"),
        weakness: None,
        suggestion: None,
    },
    FeedbackRule {
        applies: |s| s.style.lexical_diversity > 0.6,
        strength: Some("Good vocabulary diversity"),
        weakness: None,
        suggestion: None,
    },
    FeedbackRule {
        applies: |s| s.style.transition_words > 3,
        strength: Some("Good use of transition words for flow"),
        weakness: None,
        suggestion: None,
    },
    FeedbackRule {
        applies: |s| s.quality.avg_sentence_length > 25.0,
        strength: None,
        weakness: Some("Sentences tend to be too long"),
        suggestion: Some("Consider breaking long sentences into shorter ones"),
    },
    FeedbackRule {
        applies: |s| s.style.passive_voice_count > 5,
        strength: None,
        weakness: Some("Overuse of passive voice"),
        suggestion: Some("Use more active voice for stronger writing"),
    },
    FeedbackRule {
        applies: |s| s.quality.grade_level > 12.0,
        strength: None,
        weakness: Some("Writing complexity may be too high"),
        suggestion: Some("Simplify language for better accessibility"),
    },
];

const TONE_RULES: &[FeedbackRule] = &[
    FeedbackRule {
        applies: |s| s.sentiment.is_some_and(|p| p.negative_ratio > 0.3),
        strength: None,
        weakness: None,
        suggestion: Some("Consider adopting a more balanced or positive tone"),
    },
    FeedbackRule {
        applies: |s| s.sentiment.is_some_and(|p| p.positive_ratio > 0.7),
        strength: Some("Maintains a positive and engaging tone"),
        weakness: None,
        suggestion: None,
    },
];

pub fn synthesize(signals: &FeedbackSignals<'_>) -> FeedbackReport {
    let mut report = FeedbackReport::default();

    apply_rules(METRIC_RULES, signals, &mut report);
    apply_coverage_rules(signals.coverage, &mut report);
    apply_rules(TONE_RULES, signals, &mut report);

    report.overall_assessment =
        verdict(report.strengths.len(), report.weaknesses.len()).to_string();
    info!(
        strengths = report.strengths.len(),
        weaknesses = report.weaknesses.len(),
        suggestions = report.suggestions.len(),
        "feedback generated"
    );
    report
}

fn apply_rules(rules: &[FeedbackRule], signals: &FeedbackSignals<'_>, report: &mut FeedbackReport) {
    for rule in rules.iter().filter(|rule| (rule.applies)(signals)) {
        if let Some(strength) = rule.strength {
            report.strengths.push(strength.to_string());
        }
        if let Some(weakness) = rule.weakness {
            report.weaknesses.push(weakness.to_string());
        }
        if let Some(suggestion) = rule.suggestion {
            report.suggestions.push(suggestion.to_string());
        }
    }
}

/// At most three criteria, in criterion order.
fn named_criteria(coverage: &SemanticCoverage, keep: impl Fn(f64) -> bool) -> Vec<&str> {
    coverage
        .entries()
        .iter()
        .filter(|c| keep(c.entry.coverage_score))
        .map(|c| c.criterion.as_str())
        .take(NAMED_CRITERIA)
        .collect()
}

fn apply_coverage_rules(coverage: &SemanticCoverage, report: &mut FeedbackReport) {
    let well_covered = named_criteria(coverage, |score| score > WELL_COVERED);
    if !well_covered.is_empty() {
        report
            .strengths
            .push(format!("Well addressed criteria: {}", well_covered.join(", ")));
    }

    let poorly_covered = named_criteria(coverage, |score| score < POORLY_COVERED);
    if !poorly_covered.is_empty() {
        report
            .weaknesses
            .push(format!("Needs more attention: {}", poorly_covered.join(", ")));
        report
            .suggestions
            .push("Provide more detailed coverage of poorly addressed criteria".to_string());
    }
}

pub fn verdict(strengths: usize, weaknesses: usize) -> &'static str {
    match strengths.cmp(&weaknesses) {
        std::cmp::Ordering::Greater => STRONG_VERDICT,
        std::cmp::Ordering::Less => WEAK_VERDICT,
        std::cmp::Ordering::Equal => BALANCED_VERDICT,
    }
}
