use std::collections::HashSet;

use tracing::{info, warn};

use super::round_to;
use crate::grading::capabilities::{is_alphanumeric_token, CapabilityBundle, ReadabilityScores};
use crate::grading::domain::{NormalizedText, QualityMetrics};

/// Length, readability, and whole-text lexical statistics.
pub fn analyze_quality(capabilities: &CapabilityBundle, text: &NormalizedText) -> QualityMetrics {
    if text.is_empty() {
        warn!("empty text in quality analysis");
        return QualityMetrics::default();
    }

    let tokenized = capabilities.tokenizer().and_then(|tokenizer| {
        let words = tokenizer.words(&text.as_str().to_lowercase())?;
        let sentences = tokenizer.sentences(text.as_str())?;
        Ok((words, sentences))
    });
    let (words, sentences) = match tokenized {
        Ok(tokens) => tokens,
        Err(err) => {
            warn!(error = %err, "tokenizer unavailable; quality metrics defaulted");
            return QualityMetrics::default();
        }
    };

    let alphanumeric: Vec<&str> = words
        .iter()
        .map(String::as_str)
        .filter(|word| is_alphanumeric_token(word))
        .collect();
    let word_count = alphanumeric.len();
    let unique_words = alphanumeric.iter().collect::<HashSet<_>>().len();
    let sentence_count = sentences.len();
    let paragraph_count = text
        .as_str()
        .split("\n\n")
        .filter(|paragraph| !paragraph.trim().is_empty())
        .count();

    let avg_sentence_length = if sentence_count > 0 {
        word_count as f64 / sentence_count as f64
    } else {
        0.0
    };
    let avg_word_length = if word_count > 0 {
        let letters: usize = alphanumeric.iter().map(|word| word.chars().count()).sum();
        letters as f64 / word_count as f64
    } else {
        0.0
    };
    let lexical_diversity = if word_count > 0 {
        unique_words as f64 / word_count as f64
    } else {
        0.0
    };

    let readability = capabilities
        .readability()
        .and_then(|scorer| scorer.score(text.as_str()))
        .unwrap_or_else(|err| {
            warn!(error = %err, "readability scores defaulted to zero");
            ReadabilityScores::default()
        });

    let metrics = QualityMetrics {
        word_count,
        sentence_count,
        paragraph_count,
        avg_sentence_length: round_to(avg_sentence_length, 2),
        readability_score: round_to(readability.flesch_reading_ease, 2),
        grade_level: round_to(readability.flesch_kincaid_grade, 2),
        automated_readability_index: round_to(readability.automated_readability_index, 2),
        unique_words,
        avg_word_length: round_to(avg_word_length, 2),
        lexical_diversity: round_to(lexical_diversity, 3),
    };
    info!(
        word_count = metrics.word_count,
        sentence_count = metrics.sentence_count,
        readability = metrics.readability_score,
        "quality analysis complete"
    );
    metrics
}
