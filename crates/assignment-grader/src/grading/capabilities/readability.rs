use super::{CapabilityError, CapabilityKind, ReadabilityScorer, ReadabilityScores};

/// Flesch reading ease, Flesch-Kincaid grade, and the automated readability
/// index, computed with a vowel-group syllable estimate.
#[derive(Debug, Clone, Default)]
pub struct FormulaReadability;

impl ReadabilityScorer for FormulaReadability {
    fn score(&self, text: &str) -> Result<ReadabilityScores, CapabilityError> {
        let words = lexicon_words(text);
        if words.is_empty() {
            return Err(CapabilityError::failed(
                CapabilityKind::Readability,
                "text contains no words",
            ));
        }

        let word_count = words.len() as f64;
        let sentence_count = sentence_count(text) as f64;
        let syllables: usize = words.iter().map(|word| syllable_count(word)).sum();
        let characters = text.chars().filter(|c| !c.is_whitespace()).count() as f64;

        let words_per_sentence = word_count / sentence_count;
        let syllables_per_word = syllables as f64 / word_count;

        Ok(ReadabilityScores {
            flesch_reading_ease: 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word,
            flesch_kincaid_grade: 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59,
            automated_readability_index: 4.71 * (characters / word_count)
                + 0.5 * words_per_sentence
                - 21.43,
        })
    }
}

/// Whitespace-separated tokens with punctuation removed, empty ones dropped.
fn lexicon_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| {
            raw.chars()
                .filter(|c| c.is_alphanumeric() || *c == '\'')
                .collect::<String>()
        })
        .filter(|word| word.chars().any(char::is_alphanumeric))
        .collect()
}

/// Segments ending in `.!?` with more than two words; at least one.
fn sentence_count(text: &str) -> usize {
    let counted = text
        .split(['.', '!', '?'])
        .filter(|segment| segment.split_whitespace().count() > 2)
        .count();
    counted.max(1)
}

pub(crate) fn syllable_count(word: &str) -> usize {
    let letters: Vec<char> = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect();
    if letters.is_empty() {
        return 0;
    }
    if letters.len() <= 3 {
        return 1;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut groups = 0;
    let mut previous_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            groups += 1;
        }
        previous_vowel = vowel;
    }

    let n = letters.len();
    let ends_with = |suffix: &str| {
        let suffix: Vec<char> = suffix.chars().collect();
        n >= suffix.len() && letters[n - suffix.len()..] == suffix[..]
    };

    if ends_with("e") && !ends_with("le") && groups > 1 {
        groups -= 1;
    } else if (ends_with("es") || ends_with("ed")) && groups > 1 {
        let before = letters[n - 3];
        let sounded_ed = matches!(before, 't' | 'd');
        let sounded_es = ends_with("es") && matches!(before, 's' | 'x' | 'z' | 'c' | 'g');
        if !sounded_ed && !sounded_es {
            groups -= 1;
        }
    }

    groups.max(1)
}
