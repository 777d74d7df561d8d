use std::time::Duration;

use serde_json::json;

use super::common::*;
use crate::grading::capabilities::CapabilityBundle;
use crate::grading::intake::{GradeRequest, GradingJob};

fn job(text: &str, criteria: &[&str], max_score: f64) -> GradingJob {
    GradeRequest {
        text: text.to_string(),
        criteria: criteria.iter().map(|item| item.to_string()).collect(),
        max_score: Some(max_score),
    }
    .validate(100.0)
    .expect("valid request")
}

#[test]
fn final_score_never_exceeds_max_score() {
    let grader = grader(keyword_bundle());
    let criteria = criteria(&["climate policy", "market tools"]);
    for max_score in [1.0, 10.0, 10.06, 37.5, 100.0, 250.0] {
        let report = grader.grade(&essay(), &criteria, max_score);
        assert!(report.final_score >= 0.0);
        assert!(report.final_score <= max_score, "{} > {max_score}", report.final_score);
        assert!(report.percentage <= 100.0);
        assert_eq!(report.max_score, max_score);
    }
}

#[test]
fn pets_scenario_reports_coverage_and_transitions() {
    let report = grader(keyword_bundle()).grade(PETS_TEXT, &criteria(&[PETS_CRITERION]), 100.0);
    assert_eq!(report.quality_metrics.sentence_count, 2);
    assert_eq!(report.style_metrics.transition_words, 1);
    let entry = report
        .semantic_analysis
        .get(PETS_CRITERION)
        .expect("criterion covered");
    assert!(entry.coverage_score > 0.3);
    assert_eq!(report.score_breakdown.criteria_coverage, 25);
    assert_eq!(report.criteria, criteria(&[PETS_CRITERION]));
}

#[test]
fn distinct_transitions_are_each_counted() {
    let text = format!("{} Similarly, voters weigh fairness.", essay());
    let report = grader(keyword_bundle()).grade(&text, &criteria(&["climate"]), 100.0);
    assert_eq!(report.style_metrics.transition_words, 6);
    assert!(report.score_breakdown.writing_style <= 30);
}

#[test]
fn empty_criteria_use_the_coverage_fallback() {
    let report = grader(keyword_bundle()).grade(&essay(), &[], 100.0);
    assert!(report.semantic_analysis.is_empty());
    assert_eq!(report.score_breakdown.criteria_coverage, 5);
}

#[test]
fn empty_text_grades_to_defaults() {
    let report =
        grader(CapabilityBundle::builtin()).grade("   \n\t ", &criteria(&["thesis"]), 100.0);
    assert_eq!(report.quality_metrics, Default::default());
    assert_eq!(report.style_metrics, Default::default());
    assert!(report.sentiment_analysis.is_none());
    assert_eq!(report.score_breakdown.content_quality, 0);
    assert_eq!(report.score_breakdown.writing_style, 8);
    assert_eq!(report.score_breakdown.criteria_coverage, 5);
    assert_eq!(report.score_breakdown.technical_accuracy, 4);
    assert_eq!(report.final_score, 17.0);
    assert_eq!(report.percentage, 17.0);

    let value = serde_json::to_value(&report).expect("serializes");
    assert_eq!(value["sentiment_analysis"], json!({}));
    assert_eq!(value["semantic_analysis"], json!({}));
    assert_eq!(value["criteria"], json!(["thesis"]));
}

#[test]
fn small_max_score_clamps_the_total() {
    let report = grader(CapabilityBundle::builtin()).grade("", &[], 10.0);
    assert_eq!(report.final_score, 10.0);
    assert_eq!(report.percentage, 100.0);
}

#[test]
fn grading_is_deterministic() {
    let grader = grader(CapabilityBundle::builtin());
    let criteria = criteria(&["climate policy", "economic tools"]);
    let first = grader.grade(&essay(), &criteria, 100.0);
    let second = grader.grade(&essay(), &criteria, 100.0);
    assert_eq!(first, second);
}

#[test]
fn feedback_is_always_populated() {
    let report = grader(CapabilityBundle::builtin()).grade(PETS_TEXT, &[], 100.0);
    assert!(!report.feedback.overall_assessment.is_empty());
}

#[tokio::test]
async fn concurrent_grading_matches_sequential_grading() {
    let grader = grader(keyword_bundle());
    let sequential = grader.grade(&essay(), &criteria(&["climate", "markets"]), 80.0);
    let concurrent = grader
        .grade_concurrent(job(&essay(), &["climate", "markets"], 80.0))
        .await;
    assert_eq!(sequential, concurrent);
}

#[tokio::test]
async fn slow_analyzer_times_out_to_its_default() {
    let bundle =
        CapabilityBundle::builtin().with_sentiment(SlowSentiment(Duration::from_millis(300)));
    let grader = grader(bundle).with_analyzer_timeout(Duration::from_millis(20));
    let report = grader
        .grade_concurrent(job(PETS_TEXT, &[PETS_CRITERION], 100.0))
        .await;
    assert!(report.sentiment_analysis.is_none());
    assert_eq!(report.quality_metrics.word_count, 9);
}

#[tokio::test]
async fn timed_out_analyzers_are_tracked_until_they_finish() {
    let bundle =
        CapabilityBundle::builtin().with_sentiment(SlowSentiment(Duration::from_millis(200)));
    let grader = grader(bundle).with_analyzer_timeout(Duration::from_millis(20));
    assert_eq!(grader.abandoned_analyzers(), 0);

    let report = grader
        .grade_concurrent(job(PETS_TEXT, &[PETS_CRITERION], 100.0))
        .await;
    assert!(report.sentiment_analysis.is_none());
    assert!(grader.abandoned_analyzers() >= 1);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while grader.abandoned_analyzers() > 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert_eq!(grader.abandoned_analyzers(), 0);
}

#[tokio::test]
async fn fast_analyzers_leave_no_backlog() {
    let grader = grader(keyword_bundle());
    grader
        .grade_concurrent(job(PETS_TEXT, &[PETS_CRITERION], 100.0))
        .await;
    assert_eq!(grader.abandoned_analyzers(), 0);
}

#[tokio::test]
async fn panicking_analyzer_degrades_to_unknown_coverage() {
    let bundle = CapabilityBundle::builtin().with_embedder(PanickingEmbedder);
    let report = grader(bundle)
        .grade_concurrent(job(PETS_TEXT, &[PETS_CRITERION], 100.0))
        .await;
    assert!(report.semantic_analysis.is_empty());
    assert_eq!(report.score_breakdown.criteria_coverage, 5);
    assert_eq!(report.style_metrics.transition_words, 1);
}
