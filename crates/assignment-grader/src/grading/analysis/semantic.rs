use tracing::{debug, info, warn};

use crate::grading::capabilities::{CapabilityBundle, CapabilityError, CapabilityKind};
use crate::grading::domain::{
    CoverageEntry, Criterion, CriterionCoverage, NormalizedText, SemanticCoverage,
};

/// Minimum similarity for a sentence to be quoted as evidence for a criterion.
pub const RELEVANCE_THRESHOLD: f64 = 0.3;
const CANDIDATE_SENTENCES: usize = 3;
const MAX_RELEVANT_SENTENCES: usize = 2;

/// Per-criterion cosine coverage of the submission's sentences.
///
/// Returns [`SemanticCoverage::unknown`] when there are no criteria, no
/// sentences, or no embedder; callers must not read that as zero coverage.
pub fn analyze_coverage(
    capabilities: &CapabilityBundle,
    text: &NormalizedText,
    criteria: &[Criterion],
) -> SemanticCoverage {
    if criteria.is_empty() || text.is_empty() {
        warn!(
            criteria = criteria.len(),
            empty_text = text.is_empty(),
            "semantic analysis skipped"
        );
        return SemanticCoverage::unknown();
    }

    match coverage(capabilities, text, criteria) {
        Ok(coverage) => {
            info!(
                criteria = coverage.len(),
                average = coverage.average_coverage(),
                "semantic analysis complete"
            );
            coverage
        }
        Err(err) => {
            warn!(error = %err, "semantic analysis unavailable; coverage unknown");
            SemanticCoverage::unknown()
        }
    }
}

fn coverage(
    capabilities: &CapabilityBundle,
    text: &NormalizedText,
    criteria: &[Criterion],
) -> Result<SemanticCoverage, CapabilityError> {
    let sentences = capabilities.tokenizer()?.sentences(text.as_str())?;
    if sentences.is_empty() {
        warn!("no sentences found in text");
        return Ok(SemanticCoverage::unknown());
    }

    let embedder = capabilities.embedder()?;
    let sentence_refs: Vec<&str> = sentences.iter().map(String::as_str).collect();
    let criterion_refs: Vec<&str> = criteria.iter().map(Criterion::as_str).collect();
    let sentence_vectors = embedder.embed(&sentence_refs)?;
    let criterion_vectors = embedder.embed(&criterion_refs)?;
    if sentence_vectors.len() != sentences.len() || criterion_vectors.len() != criteria.len() {
        return Err(CapabilityError::failed(
            CapabilityKind::Embedder,
            "embedding count does not match input count",
        ));
    }
    debug!(
        sentences = sentence_vectors.len(),
        criteria = criterion_vectors.len(),
        "embedded sentences and criteria"
    );

    let entries = criteria
        .iter()
        .zip(&criterion_vectors)
        .map(|(criterion, criterion_vector)| {
            let similarities: Vec<f64> = sentence_vectors
                .iter()
                .map(|sentence_vector| cosine_similarity(criterion_vector, sentence_vector))
                .collect();
            CriterionCoverage {
                criterion: criterion.clone(),
                entry: coverage_entry(&sentences, &similarities),
            }
        })
        .collect();

    Ok(SemanticCoverage::new(entries))
}

fn coverage_entry(sentences: &[String], similarities: &[f64]) -> CoverageEntry {
    let max_similarity = similarities
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let avg_similarity = similarities.iter().sum::<f64>() / similarities.len() as f64;

    let mut ranked: Vec<usize> = (0..similarities.len()).collect();
    ranked.sort_by(|&a, &b| similarities[b].total_cmp(&similarities[a]));
    let relevant_sentences = ranked
        .into_iter()
        .take(CANDIDATE_SENTENCES)
        .filter(|&index| similarities[index] > RELEVANCE_THRESHOLD)
        .take(MAX_RELEVANT_SENTENCES)
        .map(|index| sentences[index].clone())
        .collect();

    CoverageEntry {
        max_similarity,
        avg_similarity,
        relevant_sentences,
        coverage_score: max_similarity,
    }
}

/// Cosine similarity; zero when either vector has no magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_handles_orthogonal_opposite_and_zero_vectors() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn relevant_sentences_come_from_top_three_above_threshold() {
        let sentences: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let entry = coverage_entry(&sentences, &[0.2, 0.9, 0.5, 0.31]);
        assert_eq!(entry.relevant_sentences, vec!["b", "c"]);
        assert_eq!(entry.coverage_score, 0.9);
        assert_eq!(entry.max_similarity, 0.9);
        assert!((entry.avg_similarity - 0.4775).abs() < 1e-9);
    }

    #[test]
    fn low_similarity_yields_no_evidence_and_may_be_negative() {
        let sentences: Vec<String> = vec!["only".to_string()];
        let entry = coverage_entry(&sentences, &[-0.25]);
        assert!(entry.relevant_sentences.is_empty());
        assert_eq!(entry.coverage_score, -0.25);
    }

    #[test]
    fn equal_similarities_prefer_earlier_sentences() {
        let sentences: Vec<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
        let entry = coverage_entry(&sentences, &[0.8, 0.8, 0.8]);
        assert_eq!(entry.relevant_sentences, vec!["x", "y"]);
    }
}
