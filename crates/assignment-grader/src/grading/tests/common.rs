use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::grading::capabilities::{
    CapabilityBundle, CapabilityError, CapabilityKind, SentenceEmbedder, SentimentClassifier,
    SentimentLabel,
};
use crate::grading::domain::Criterion;
use crate::grading::pipeline::Grader;

pub(super) const PETS_TEXT: &str = "Cats are popular pets. However, many people prefer dogs.";
pub(super) const PETS_CRITERION: &str = "discusses pet preferences";

/// Concept groups; a text gets weight 1 on every group it mentions.
const CONCEPTS: &[&[&str]] = &[
    &["pet", "cat", "dog"],
    &["prefer"],
    &["climate", "carbon", "emission"],
    &["econom", "market", "price"],
];

/// Deterministic embedder keyed on concept keywords.
pub(super) struct KeywordEmbedder;

impl SentenceEmbedder for KeywordEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, CapabilityError> {
        Ok(texts
            .iter()
            .map(|text| {
                let lowered = text.to_lowercase();
                CONCEPTS
                    .iter()
                    .map(|keywords| {
                        if keywords.iter().any(|keyword| lowered.contains(keyword)) {
                            1.0
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect())
    }
}

pub(super) struct FailingEmbedder;

impl SentenceEmbedder for FailingEmbedder {
    fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, CapabilityError> {
        Err(CapabilityError::failed(CapabilityKind::Embedder, "model offline"))
    }
}

pub(super) struct PanickingEmbedder;

impl SentenceEmbedder for PanickingEmbedder {
    fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, CapabilityError> {
        panic!("embedding runtime crashed");
    }
}

/// `wonderful` -> positive, `terrible` -> negative, `xfailurex` -> error, else neutral.
pub(super) struct KeywordSentiment;

impl SentimentClassifier for KeywordSentiment {
    fn classify(&self, chunk: &str) -> Result<SentimentLabel, CapabilityError> {
        if chunk.contains("xfailurex") {
            return Err(CapabilityError::failed(CapabilityKind::Sentiment, "chunk rejected"));
        }
        let label = if chunk.contains("wonderful") {
            "positive"
        } else if chunk.contains("terrible") {
            "negative"
        } else {
            "neutral"
        };
        Ok(SentimentLabel {
            label: label.to_string(),
            confidence: 0.9,
        })
    }
}

pub(super) struct SlowSentiment(pub Duration);

impl SentimentClassifier for SlowSentiment {
    fn classify(&self, _chunk: &str) -> Result<SentimentLabel, CapabilityError> {
        thread::sleep(self.0);
        Ok(SentimentLabel {
            label: "positive".to_string(),
            confidence: 1.0,
        })
    }
}

pub(super) fn keyword_bundle() -> CapabilityBundle {
    CapabilityBundle::builtin()
        .with_embedder(KeywordEmbedder)
        .with_sentiment(KeywordSentiment)
}

pub(super) fn grader(bundle: CapabilityBundle) -> Grader {
    Grader::new(Arc::new(bundle))
}

pub(super) fn criteria(items: &[&str]) -> Vec<Criterion> {
    items.iter().map(|item| Criterion::from(*item)).collect()
}

/// Fifty copies of a ten-character word: exactly one 500-character chunk.
pub(super) fn chunk_of(word: &str) -> String {
    assert_eq!(word.len(), 9, "word plus trailing space must fill ten characters");
    format!("{word} ").repeat(50)
}

pub(super) fn essay() -> String {
    [
        "Climate policy shapes the modern economy in visible ways.",
        "However, carbon pricing remains contested among economists.",
        "Therefore, governments often combine market tools with regulation.",
        "Moreover, emission targets were adopted by many countries.",
        "Additionally, public support depends on how costs are shared.",
        "Consequently, careful design matters more than ambition alone.",
    ]
    .join(" ")
}
