use std::collections::HashSet;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Upload formats accepted at the intake boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Txt,
    Docx,
}

impl DocumentFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Txt),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, extension) = filename.rsplit_once('.')?;
        Self::from_extension(extension)
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Txt => "txt",
            DocumentFormat::Docx => "docx",
        }
    }
}

/// Raw uploaded bytes plus the declared format tag.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
}

/// Text that has passed through the normalizer. Only the normalizer builds one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(pub(crate) String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Leading characters for report previews, with an ellipsis when truncated.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.0.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

/// One grading dimension supplied by the caller. Identity is positional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Criterion(pub String);

impl Criterion {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Criterion {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Criterion {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub paragraph_count: usize,
    pub avg_sentence_length: f64,
    pub readability_score: f64,
    pub grade_level: f64,
    pub automated_readability_index: f64,
    pub unique_words: usize,
    pub avg_word_length: f64,
    pub lexical_diversity: f64,
}

/// Content word and its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleMetrics {
    pub avg_sentence_length: f64,
    pub sentence_length_variance: f64,
    /// Unique content words over content words; differs from the quality figure on purpose.
    pub lexical_diversity: f64,
    pub word_frequency_distribution: Vec<WordFrequency>,
    pub complex_words: usize,
    pub simple_words: usize,
    pub paragraph_count: usize,
    pub transition_words: usize,
    pub passive_voice_count: usize,
    pub question_count: usize,
    pub exclamation_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageEntry {
    pub max_similarity: f64,
    pub avg_similarity: f64,
    pub relevant_sentences: Vec<String>,
    /// Cosine similarity, so it may be negative.
    pub coverage_score: f64,
}

/// Coverage for one criterion position.
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionCoverage {
    pub criterion: Criterion,
    pub entry: CoverageEntry,
}

/// Per-criterion coverage in criterion order. Empty means "coverage unknown".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SemanticCoverage {
    entries: Vec<CriterionCoverage>,
}

impl SemanticCoverage {
    pub fn new(entries: Vec<CriterionCoverage>) -> Self {
        Self { entries }
    }

    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[CriterionCoverage] {
        &self.entries
    }

    /// First entry whose criterion text matches.
    pub fn get(&self, criterion: &str) -> Option<&CoverageEntry> {
        self.entries
            .iter()
            .find(|coverage| coverage.criterion.as_str() == criterion)
            .map(|coverage| &coverage.entry)
    }

    pub fn average_coverage(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        let total: f64 = self.entries.iter().map(|c| c.entry.coverage_score).sum();
        Some(total / self.entries.len() as f64)
    }
}

impl Serialize for SemanticCoverage {
    /// Keyed by criterion text. A key already taken gets the entry's 1-based position
    /// appended, counting upward until it no longer collides.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        let mut emitted: HashSet<String> = HashSet::with_capacity(self.entries.len());
        for (index, coverage) in self.entries.iter().enumerate() {
            let text = coverage.criterion.as_str();
            let mut key = text.to_string();
            let mut position = index + 1;
            while emitted.contains(&key) {
                key = format!("{text} #{position}");
                position += 1;
            }
            map.serialize_entry(&key, &coverage.entry)?;
            emitted.insert(key);
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Neutral,
    Negative,
}

impl Tone {
    /// Tie-break order used when two tones receive the same number of votes.
    pub const ORDER: [Tone; 3] = [Tone::Positive, Tone::Neutral, Tone::Negative];

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" => Some(Self::Positive),
            "neutral" | "neu" => Some(Self::Neutral),
            "negative" | "neg" => Some(Self::Negative),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tone::Positive => "positive",
            Tone::Neutral => "neutral",
            Tone::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentProfile {
    pub positive_ratio: f64,
    pub neutral_ratio: f64,
    pub negative_ratio: f64,
    pub overall_tone: Tone,
}

/// Points per rubric dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub content_quality: u32,
    pub writing_style: u32,
    pub criteria_coverage: u32,
    pub technical_accuracy: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.content_quality + self.writing_style + self.criteria_coverage + self.technical_accuracy
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub overall_assessment: String,
}

/// Fully-shaped grading result; every field is present even for degenerate input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeReport {
    pub final_score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub score_breakdown: ScoreBreakdown,
    pub quality_metrics: QualityMetrics,
    pub style_metrics: StyleMetrics,
    pub semantic_analysis: SemanticCoverage,
    #[serde(serialize_with = "profile_or_empty")]
    pub sentiment_analysis: Option<SentimentProfile>,
    pub feedback: FeedbackReport,
    pub criteria: Vec<Criterion>,
}

fn profile_or_empty<S: Serializer>(
    profile: &Option<SentimentProfile>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match profile {
        Some(profile) => profile.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}
