use super::{
    CapabilityError, CapabilityKind, RuleTokenizer, SentimentClassifier, SentimentLabel,
    TextTokenizer,
};
use crate::grading::lexicon::{NEGATIONS, NEGATIVE_WORDS, POSITIVE_WORDS};

const NEGATION_WINDOW: usize = 3;
const NORMALIZATION_ALPHA: f64 = 15.0;
const NEUTRAL_BAND: f64 = 0.05;

/// Word-list polarity classifier. Each opinion word scores +/-1, flipped when
/// a negation appears within the three preceding tokens; the summed score is
/// squashed into [-1, 1] and anything inside +/-0.05 is neutral.
#[derive(Debug, Clone, Default)]
pub struct LexiconSentiment {
    tokenizer: RuleTokenizer,
}

impl LexiconSentiment {
    /// Compound polarity in [-1, 1].
    pub fn compound(&self, chunk: &str) -> Result<f64, CapabilityError> {
        let lowered = chunk.to_lowercase();
        let tokens = self
            .tokenizer
            .words(&lowered)
            .map_err(|err| CapabilityError::failed(CapabilityKind::Sentiment, err))?;

        let mut score = 0.0;
        for (index, token) in tokens.iter().enumerate() {
            let polarity = if POSITIVE_WORDS.contains(&token.as_str()) {
                1.0
            } else if NEGATIVE_WORDS.contains(&token.as_str()) {
                -1.0
            } else {
                continue;
            };
            let window_start = index.saturating_sub(NEGATION_WINDOW);
            let negated = tokens[window_start..index]
                .iter()
                .any(|previous| NEGATIONS.contains(&previous.as_str()));
            score += if negated { -polarity } else { polarity };
        }

        if score == 0.0 {
            return Ok(0.0);
        }
        Ok(score / (score * score + NORMALIZATION_ALPHA).sqrt())
    }
}

impl SentimentClassifier for LexiconSentiment {
    fn classify(&self, chunk: &str) -> Result<SentimentLabel, CapabilityError> {
        if !chunk.chars().any(char::is_alphanumeric) {
            return Err(CapabilityError::failed(
                CapabilityKind::Sentiment,
                "chunk contains no words",
            ));
        }

        let compound = self.compound(chunk)?;
        let label = if compound >= NEUTRAL_BAND {
            "positive"
        } else if compound <= -NEUTRAL_BAND {
            "negative"
        } else {
            "neutral"
        };
        let confidence = if label == "neutral" {
            1.0 - compound.abs()
        } else {
            compound.abs()
        };

        Ok(SentimentLabel {
            label: label.to_string(),
            confidence: confidence as f32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(text: &str) -> String {
        LexiconSentiment::default()
            .classify(text)
            .expect("classifies")
            .label
    }

    #[test]
    fn labels_follow_word_polarity() {
        assert_eq!(label("This is a great and effective approach."), "positive");
        assert_eq!(label("The plan was a costly failure."), "negative");
        assert_eq!(label("The meeting is on Tuesday."), "neutral");
    }

    #[test]
    fn negation_flips_polarity() {
        assert_eq!(label("The results were not good."), "negative");
        assert_eq!(label("It isn't a problem."), "positive");
    }

    #[test]
    fn compound_is_bounded() {
        let text = "good ".repeat(200);
        let compound = LexiconSentiment::default().compound(&text).expect("scores");
        assert!(compound > 0.9 && compound <= 1.0, "{compound}");
    }

    #[test]
    fn wordless_chunk_fails() {
        assert!(LexiconSentiment::default().classify("... !!").is_err());
    }
}
