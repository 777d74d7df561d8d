//! Narrow interfaces over the external models and tools the analyzers consume.
//!
//! Every capability call returns `Result<_, CapabilityError>`; the analyzers
//! decide how a failure degrades their own output. A [`CapabilityBundle`] is
//! built once per process and shared read-only across requests.

mod embedding;
pub(crate) mod extractor;
#[cfg(feature = "onnx")]
mod onnx;
mod parser;
mod readability;
mod sentiment;
mod tokenizer;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::domain::Document;
use crate::config::{EmbedderBackend, GradingConfig, SentimentBackend};

pub use embedding::HashingEmbedder;
pub use extractor::DocumentExtractor;
#[cfg(feature = "onnx")]
pub use onnx::{OnnxEmbedder, OnnxSentimentClassifier};
pub use parser::PassiveHeuristicParser;
pub use readability::FormulaReadability;
pub use sentiment::LexiconSentiment;
pub use tokenizer::{is_alphanumeric_token, RuleTokenizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Tokenizer,
    Readability,
    Embedder,
    Sentiment,
    Parser,
    Extractor,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CapabilityKind::Tokenizer => "tokenizer",
            CapabilityKind::Readability => "readability",
            CapabilityKind::Embedder => "embedder",
            CapabilityKind::Sentiment => "sentiment classifier",
            CapabilityKind::Parser => "dependency parser",
            CapabilityKind::Extractor => "text extractor",
        };
        f.write_str(name)
    }
}

/// Failure of a single capability call. Never fatal to the pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CapabilityError {
    #[error("{0} is not loaded")]
    Unavailable(CapabilityKind),
    #[error("{capability} failed: {message}")]
    Failed {
        capability: CapabilityKind,
        message: String,
    },
}

impl CapabilityError {
    pub fn failed(capability: CapabilityKind, message: impl fmt::Display) -> Self {
        Self::Failed {
            capability,
            message: message.to_string(),
        }
    }
}

pub trait TextTokenizer: Send + Sync {
    fn sentences(&self, text: &str) -> Result<Vec<String>, CapabilityError>;
    fn words(&self, text: &str) -> Result<Vec<String>, CapabilityError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ReadabilityScores {
    pub flesch_reading_ease: f64,
    pub flesch_kincaid_grade: f64,
    pub automated_readability_index: f64,
}

pub trait ReadabilityScorer: Send + Sync {
    fn score(&self, text: &str) -> Result<ReadabilityScores, CapabilityError>;
}

/// Text to fixed-dimension vectors, one per input, in input order.
pub trait SentenceEmbedder: Send + Sync {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, CapabilityError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentLabel {
    pub label: String,
    pub confidence: f32,
}

pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, chunk: &str) -> Result<SentimentLabel, CapabilityError>;
}

/// One flag per token; `true` marks a passive nominal subject.
pub trait DependencyParser: Send + Sync {
    fn passive_subject_flags(&self, text: &str) -> Result<Vec<bool>, CapabilityError>;
}

pub trait TextExtractor: Send + Sync {
    fn extract(&self, document: &Document) -> Result<String, CapabilityError>;
}

/// Process-wide set of loaded capabilities. An empty slot means "unavailable".
#[derive(Clone, Default)]
pub struct CapabilityBundle {
    tokenizer: Option<Arc<dyn TextTokenizer>>,
    readability: Option<Arc<dyn ReadabilityScorer>>,
    embedder: Option<Arc<dyn SentenceEmbedder>>,
    sentiment: Option<Arc<dyn SentimentClassifier>>,
    parser: Option<Arc<dyn DependencyParser>>,
    extractor: Option<Arc<dyn TextExtractor>>,
}

impl CapabilityBundle {
    /// Bundle with nothing loaded; every analyzer falls back to its defaults.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All rule-based implementations; needs no model files.
    pub fn builtin() -> Self {
        Self::empty()
            .with_tokenizer(RuleTokenizer::default())
            .with_readability(FormulaReadability::default())
            .with_embedder(HashingEmbedder::default())
            .with_sentiment(LexiconSentiment::default())
            .with_parser(PassiveHeuristicParser::default())
            .with_extractor(DocumentExtractor)
    }

    pub fn from_config(config: &GradingConfig) -> Self {
        let mut bundle = Self::empty()
            .with_tokenizer(RuleTokenizer::default())
            .with_readability(FormulaReadability::default())
            .with_parser(PassiveHeuristicParser::default())
            .with_extractor(DocumentExtractor);

        bundle.embedder = load_embedder(config);
        bundle.sentiment = load_sentiment(config);

        let status = bundle.status();
        info!(?status, "capability bundle ready");
        bundle
    }

    pub fn with_tokenizer(mut self, tokenizer: impl TextTokenizer + 'static) -> Self {
        self.tokenizer = Some(Arc::new(tokenizer));
        self
    }

    pub fn with_readability(mut self, scorer: impl ReadabilityScorer + 'static) -> Self {
        self.readability = Some(Arc::new(scorer));
        self
    }

    pub fn with_embedder(mut self, embedder: impl SentenceEmbedder + 'static) -> Self {
        self.embedder = Some(Arc::new(embedder));
        self
    }

    pub fn with_sentiment(mut self, classifier: impl SentimentClassifier + 'static) -> Self {
        self.sentiment = Some(Arc::new(classifier));
        self
    }

    pub fn with_parser(mut self, parser: impl DependencyParser + 'static) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    pub fn with_extractor(mut self, extractor: impl TextExtractor + 'static) -> Self {
        self.extractor = Some(Arc::new(extractor));
        self
    }

    pub fn without_embedder(mut self) -> Self {
        self.embedder = None;
        self
    }

    pub fn without_sentiment(mut self) -> Self {
        self.sentiment = None;
        self
    }

    pub fn without_parser(mut self) -> Self {
        self.parser = None;
        self
    }

    pub fn tokenizer(&self) -> Result<&dyn TextTokenizer, CapabilityError> {
        self.tokenizer
            .as_deref()
            .ok_or(CapabilityError::Unavailable(CapabilityKind::Tokenizer))
    }

    pub fn readability(&self) -> Result<&dyn ReadabilityScorer, CapabilityError> {
        self.readability
            .as_deref()
            .ok_or(CapabilityError::Unavailable(CapabilityKind::Readability))
    }

    pub fn embedder(&self) -> Result<&dyn SentenceEmbedder, CapabilityError> {
        self.embedder
            .as_deref()
            .ok_or(CapabilityError::Unavailable(CapabilityKind::Embedder))
    }

    pub fn sentiment(&self) -> Result<&dyn SentimentClassifier, CapabilityError> {
        self.sentiment
            .as_deref()
            .ok_or(CapabilityError::Unavailable(CapabilityKind::Sentiment))
    }

    pub fn parser(&self) -> Result<&dyn DependencyParser, CapabilityError> {
        self.parser
            .as_deref()
            .ok_or(CapabilityError::Unavailable(CapabilityKind::Parser))
    }

    pub fn extractor(&self) -> Result<&dyn TextExtractor, CapabilityError> {
        self.extractor
            .as_deref()
            .ok_or(CapabilityError::Unavailable(CapabilityKind::Extractor))
    }

    pub fn status(&self) -> CapabilityStatus {
        CapabilityStatus {
            tokenizer: self.tokenizer.is_some(),
            readability: self.readability.is_some(),
            embedder: self.embedder.is_some(),
            sentiment: self.sentiment.is_some(),
            parser: self.parser.is_some(),
            extractor: self.extractor.is_some(),
        }
    }
}

impl fmt::Debug for CapabilityBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityBundle")
            .field("status", &self.status())
            .finish()
    }
}

/// Which capability slots are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityStatus {
    pub tokenizer: bool,
    pub readability: bool,
    pub embedder: bool,
    pub sentiment: bool,
    pub parser: bool,
    pub extractor: bool,
}

fn load_embedder(config: &GradingConfig) -> Option<Arc<dyn SentenceEmbedder>> {
    match config.embedder {
        EmbedderBackend::Disabled => {
            warn!("embedder disabled by configuration; criteria coverage will be unknown");
            None
        }
        EmbedderBackend::Hashing => Some(Arc::new(HashingEmbedder::default())),
        EmbedderBackend::Onnx => load_onnx_embedder(config),
    }
}

fn load_sentiment(config: &GradingConfig) -> Option<Arc<dyn SentimentClassifier>> {
    match config.sentiment {
        SentimentBackend::Disabled => {
            warn!("sentiment classifier disabled by configuration");
            None
        }
        SentimentBackend::Lexicon => Some(Arc::new(LexiconSentiment::default())),
        SentimentBackend::Onnx => load_onnx_sentiment(config),
    }
}

#[cfg(feature = "onnx")]
fn load_onnx_embedder(config: &GradingConfig) -> Option<Arc<dyn SentenceEmbedder>> {
    let Some(dir) = config.embedding_model_dir.as_deref() else {
        warn!("GRADER_EMBEDDING_MODEL_DIR not set; embedder unavailable");
        return None;
    };
    match OnnxEmbedder::load(dir) {
        Ok(embedder) => Some(Arc::new(embedder)),
        Err(err) => {
            warn!(error = %err, dir = %dir.display(), "failed to load embedding model");
            None
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn load_onnx_embedder(_config: &GradingConfig) -> Option<Arc<dyn SentenceEmbedder>> {
    warn!("onnx embedder requested but the `onnx` feature is not compiled in");
    None
}

#[cfg(feature = "onnx")]
fn load_onnx_sentiment(config: &GradingConfig) -> Option<Arc<dyn SentimentClassifier>> {
    let Some(dir) = config.sentiment_model_dir.as_deref() else {
        warn!("GRADER_SENTIMENT_MODEL_DIR not set; sentiment classifier unavailable");
        return None;
    };
    match OnnxSentimentClassifier::load(dir) {
        Ok(classifier) => Some(Arc::new(classifier)),
        Err(err) => {
            warn!(error = %err, dir = %dir.display(), "failed to load sentiment model");
            None
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn load_onnx_sentiment(_config: &GradingConfig) -> Option<Arc<dyn SentimentClassifier>> {
    warn!("onnx sentiment classifier requested but the `onnx` feature is not compiled in");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(embedder: EmbedderBackend, sentiment: SentimentBackend) -> GradingConfig {
        GradingConfig {
            default_max_score: 100.0,
            analyzer_timeout: Duration::from_secs(5),
            max_upload_bytes: 1024,
            embedder,
            sentiment,
            embedding_model_dir: None,
            sentiment_model_dir: None,
        }
    }

    #[test]
    fn builtin_bundle_loads_every_slot() {
        let status = CapabilityBundle::builtin().status();
        assert!(status.tokenizer && status.readability && status.embedder);
        assert!(status.sentiment && status.parser && status.extractor);
    }

    #[test]
    fn empty_bundle_reports_unavailable() {
        let bundle = CapabilityBundle::empty();
        assert_eq!(
            bundle.embedder().err(),
            Some(CapabilityError::Unavailable(CapabilityKind::Embedder))
        );
        assert!(bundle.tokenizer().is_err());
    }

    #[test]
    fn from_config_respects_disabled_backends() {
        let bundle = CapabilityBundle::from_config(&config(
            EmbedderBackend::Disabled,
            SentimentBackend::Lexicon,
        ));
        let status = bundle.status();
        assert!(!status.embedder);
        assert!(status.sentiment);
        assert!(status.tokenizer);
    }

    #[test]
    fn onnx_backend_without_model_dir_leaves_slot_empty() {
        let bundle =
            CapabilityBundle::from_config(&config(EmbedderBackend::Onnx, SentimentBackend::Onnx));
        let status = bundle.status();
        assert!(!status.embedder);
        assert!(!status.sentiment);
    }
}
