use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::grading::capabilities::{
    is_alphanumeric_token, CapabilityBundle, CapabilityError, TextTokenizer,
};
use crate::grading::domain::{NormalizedText, StyleMetrics, WordFrequency};
use crate::grading::lexicon::{is_stopword, TRANSITION_WORDS};

const TOP_WORDS: usize = 10;
const COMPLEX_WORD_CHARS: usize = 6;

/// Sentence structure, diction, transitions, and passive voice.
pub fn analyze_style(capabilities: &CapabilityBundle, text: &NormalizedText) -> StyleMetrics {
    if text.is_empty() {
        warn!("empty text in style analysis");
        return StyleMetrics::default();
    }

    let tokenizer = match capabilities.tokenizer() {
        Ok(tokenizer) => tokenizer,
        Err(err) => {
            warn!(error = %err, "tokenizer unavailable; style metrics defaulted");
            return StyleMetrics::default();
        }
    };
    let sentence_lengths = match sentence_token_counts(tokenizer, text.as_str()) {
        Ok(lengths) => lengths,
        Err(err) => {
            warn!(error = %err, "sentence tokenization failed; style metrics defaulted");
            return StyleMetrics::default();
        }
    };
    let content_words: Vec<String> = match tokenizer.words(&text.as_str().to_lowercase()) {
        Ok(words) => words
            .into_iter()
            .filter(|word| is_alphanumeric_token(word) && !is_stopword(word))
            .collect(),
        Err(err) => {
            warn!(error = %err, "word tokenization failed; style metrics defaulted");
            return StyleMetrics::default();
        }
    };

    let (avg_sentence_length, sentence_length_variance) = mean_and_variance(&sentence_lengths);
    let lexical_diversity = if content_words.is_empty() {
        0.0
    } else {
        let distinct = content_words.iter().collect::<HashSet<_>>().len();
        distinct as f64 / content_words.len() as f64
    };
    let complex_words = content_words
        .iter()
        .filter(|word| word.chars().count() > COMPLEX_WORD_CHARS)
        .count();

    let metrics = StyleMetrics {
        avg_sentence_length,
        sentence_length_variance,
        lexical_diversity,
        word_frequency_distribution: most_common(&content_words, TOP_WORDS),
        complex_words,
        simple_words: content_words.len() - complex_words,
        paragraph_count: text
            .as_str()
            .split("\n\n")
            .filter(|paragraph| !paragraph.trim().is_empty())
            .count(),
        transition_words: count_transition_words(text.as_str()),
        passive_voice_count: count_passive_voice(capabilities, text.as_str()),
        question_count: text.as_str().matches('?').count(),
        exclamation_count: text.as_str().matches('!').count(),
    };
    info!(
        transition_words = metrics.transition_words,
        passive_voice = metrics.passive_voice_count,
        lexical_diversity = metrics.lexical_diversity,
        "style analysis complete"
    );
    metrics
}

fn sentence_token_counts(
    tokenizer: &dyn TextTokenizer,
    text: &str,
) -> Result<Vec<usize>, CapabilityError> {
    tokenizer
        .sentences(text)?
        .iter()
        .map(|sentence| tokenizer.words(sentence).map(|tokens| tokens.len()))
        .collect()
}

/// Population mean and variance; both zero for no samples.
fn mean_and_variance(samples: &[usize]) -> (f64, f64) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<usize>() as f64 / n;
    let variance = samples
        .iter()
        .map(|&sample| (sample as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean, variance)
}

/// Highest counts first; equal counts keep first-encountered order.
fn most_common(words: &[String], limit: usize) -> Vec<WordFrequency> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in words {
        let count = counts.entry(word.as_str()).or_insert(0);
        if *count == 0 {
            order.push(word.as_str());
        }
        *count += 1;
    }

    let mut ranked: Vec<WordFrequency> = order
        .into_iter()
        .map(|word| WordFrequency {
            word: word.to_string(),
            count: counts[word],
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}

/// Distinct transition words present anywhere in the lowercased text.
pub(crate) fn count_transition_words(text: &str) -> usize {
    let lowered = text.to_lowercase();
    TRANSITION_WORDS
        .iter()
        .filter(|word| lowered.contains(*word))
        .count()
}

fn count_passive_voice(capabilities: &CapabilityBundle, text: &str) -> usize {
    match capabilities
        .parser()
        .and_then(|parser| parser.passive_subject_flags(text))
    {
        Ok(flags) => flags.into_iter().filter(|flag| *flag).count(),
        Err(err) => {
            warn!(error = %err, "passive voice analysis unavailable; counted as zero");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|word| word.to_string()).collect()
    }

    #[test]
    fn transition_words_count_presence_not_frequency() {
        assert_eq!(count_transition_words("However, however, HOWEVER."), 1);
        assert_eq!(count_transition_words("Therefore it rained; moreover it snowed."), 2);
        assert_eq!(count_transition_words("Nothing to see."), 0);
    }

    #[test]
    fn most_common_breaks_ties_by_first_occurrence() {
        let ranked = most_common(&words(&["beta", "alpha", "beta", "alpha", "gamma"]), 10);
        let order: Vec<&str> = ranked.iter().map(|entry| entry.word.as_str()).collect();
        assert_eq!(order, vec!["beta", "alpha", "gamma"]);
        assert_eq!(ranked[0].count, 2);
    }

    #[test]
    fn most_common_caps_at_limit() {
        let many: Vec<String> = (0..15).map(|i| format!("word{i}")).collect();
        assert_eq!(most_common(&many, 10).len(), 10);
    }

    #[test]
    fn variance_is_population_variance() {
        assert_eq!(mean_and_variance(&[5, 6]), (5.5, 0.25));
        assert_eq!(mean_and_variance(&[]), (0.0, 0.0));
    }
}
