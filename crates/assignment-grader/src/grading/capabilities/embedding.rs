use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::tokenizer::is_alphanumeric_token;
use super::{CapabilityError, CapabilityKind, RuleTokenizer, SentenceEmbedder, TextTokenizer};
use crate::grading::lexicon::is_stopword;

const DEFAULT_DIMENSION: usize = 256;
const STEM_PREFIX: usize = 5;
const BIGRAM_WEIGHT: f32 = 0.5;

/// Offline embedder: feature-hashed content-word stems and stem bigrams,
/// L2-normalized. Captures lexical overlap only, not meaning.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    tokenizer: RuleTokenizer,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            tokenizer: RuleTokenizer,
        }
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>, CapabilityError> {
        let lowered = text.to_lowercase();
        let stems: Vec<String> = self
            .tokenizer
            .words(&lowered)?
            .into_iter()
            .filter(|word| is_alphanumeric_token(word) && !is_stopword(word))
            .map(|word| stem(&word))
            .collect();

        let mut vector = vec![0.0f32; self.dimension];
        for token in &stems {
            vector[self.bucket(token)] += 1.0;
        }
        for pair in stems.windows(2) {
            let bigram = format!("{}_{}", pair[0], pair[1]);
            vector[self.bucket(&bigram)] += BIGRAM_WEIGHT;
        }

        normalize(&mut vector);
        Ok(vector)
    }

    fn bucket(&self, feature: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        (hasher.finish() % self.dimension as u64) as usize
    }
}

impl SentenceEmbedder for HashingEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, CapabilityError> {
        texts
            .iter()
            .map(|text| self.embed_one(text))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| CapabilityError::failed(CapabilityKind::Embedder, err))
    }
}

/// Plural `s` dropped, then truncated to a fixed prefix (`preferences` and `prefer` share `prefe`).
fn stem(word: &str) -> String {
    let trimmed = if word.chars().count() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        &word[..word.len() - 1]
    } else {
        word
    };
    trimmed.chars().take(STEM_PREFIX).collect()
}

/// L2-normalize a vector in place.
fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn vectors_are_unit_length_with_fixed_dimension() {
        let embedder = HashingEmbedder::default();
        let vectors = embedder
            .embed(&["Cats are popular pets.", "Dogs are loyal."])
            .expect("embeds");
        assert_eq!(vectors.len(), 2);
        for vector in &vectors {
            assert_eq!(vector.len(), 256);
            let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-4, "expected unit norm, got {norm}");
        }
    }

    #[test]
    fn overlapping_texts_are_closer() {
        let embedder = HashingEmbedder::default();
        let vectors = embedder
            .embed(&[
                "pet preferences",
                "many people prefer pets",
                "quarterly tax legislation",
            ])
            .expect("embeds");

        let related = cosine_sim(&vectors[0], &vectors[1]);
        let unrelated = cosine_sim(&vectors[0], &vectors[2]);
        assert!(related > unrelated, "{related} <= {unrelated}");
    }

    #[test]
    fn stopword_only_text_yields_zero_vector() {
        let embedder = HashingEmbedder::default();
        let vectors = embedder.embed(&["the and of"]).expect("embeds");
        assert!(vectors[0].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn stemming_merges_plural_and_prefix_forms() {
        assert_eq!(stem("pets"), "pet");
        assert_eq!(stem("preferences"), stem("prefer"));
        assert_eq!(stem("class"), "class");
    }

    #[test]
    fn identical_inputs_embed_identically() {
        let embedder = HashingEmbedder::default();
        let first = embedder.embed(&["Deterministic output"]).expect("embeds");
        let second = embedder.embed(&["Deterministic output"]).expect("embeds");
        assert_eq!(first, second);
    }
}
