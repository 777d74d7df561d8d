use tracing::{debug, info, warn};

use crate::grading::capabilities::CapabilityBundle;
use crate::grading::domain::{NormalizedText, SentimentProfile, Tone};

/// Characters per classified chunk.
pub const CHUNK_CHARS: usize = 500;

/// Chunk-vote sentiment distribution. `None` when no chunk could be classified.
pub fn analyze_tone(
    capabilities: &CapabilityBundle,
    text: &NormalizedText,
) -> Option<SentimentProfile> {
    let classifier = match capabilities.sentiment() {
        Ok(classifier) => classifier,
        Err(err) => {
            warn!(error = %err, "sentiment analysis unavailable");
            return None;
        }
    };

    let chars: Vec<char> = text.as_str().chars().collect();
    let mut votes = [0usize; 3];
    let mut classified = 0usize;
    for (index, chunk) in chars.chunks(CHUNK_CHARS).enumerate() {
        let chunk: String = chunk.iter().collect();
        if chunk.trim().is_empty() {
            continue;
        }
        match classifier.classify(&chunk) {
            Ok(result) => {
                classified += 1;
                debug!(
                    chunk = index,
                    label = %result.label,
                    confidence = result.confidence,
                    "chunk classified"
                );
                if let Some(tone) = Tone::from_label(&result.label) {
                    votes[tone_slot(tone)] += 1;
                }
            }
            Err(err) => {
                warn!(chunk = index, error = %err, "sentiment classification failed for chunk");
            }
        }
    }

    if classified == 0 {
        warn!("no valid sentiment analysis results");
        return None;
    }

    let total = classified as f64;
    let profile = SentimentProfile {
        positive_ratio: votes[tone_slot(Tone::Positive)] as f64 / total,
        neutral_ratio: votes[tone_slot(Tone::Neutral)] as f64 / total,
        negative_ratio: votes[tone_slot(Tone::Negative)] as f64 / total,
        overall_tone: dominant_tone(&votes),
    };
    info!(
        tone = profile.overall_tone.label(),
        chunks = classified,
        "sentiment analysis complete"
    );
    Some(profile)
}

fn tone_slot(tone: Tone) -> usize {
    Tone::ORDER
        .iter()
        .position(|candidate| *candidate == tone)
        .unwrap_or_default()
}

/// Most votes wins; ties go to the earlier tone in [`Tone::ORDER`].
fn dominant_tone(votes: &[usize; 3]) -> Tone {
    let mut best = Tone::ORDER[0];
    let mut best_votes = votes[0];
    for (slot, tone) in Tone::ORDER.iter().enumerate().skip(1) {
        if votes[slot] > best_votes {
            best = *tone;
            best_votes = votes[slot];
        }
    }
    best
}
