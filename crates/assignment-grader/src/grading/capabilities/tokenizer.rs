use super::{CapabilityError, TextTokenizer};
use crate::grading::lexicon::ABBREVIATIONS;

const CONTRACTION_SUFFIXES: [&str; 6] = ["'s", "'re", "'ve", "'ll", "'d", "'m"];
const CLOSING_MARKS: [char; 4] = ['"', '\'', ')', ']'];

/// Rule-based English tokenizer: punctuation split into its own tokens,
/// contractions separated (`don't` -> `do`, `n't`), sentences ended by
/// `.`, `!`, or `?` followed by whitespace unless the period closes an
/// abbreviation or an initial.
#[derive(Debug, Clone, Default)]
pub struct RuleTokenizer;

/// True for a non-empty token made only of alphanumeric characters.
pub fn is_alphanumeric_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphanumeric)
}

impl TextTokenizer for RuleTokenizer {
    fn sentences(&self, text: &str) -> Result<Vec<String>, CapabilityError> {
        Ok(split_sentences(text))
    }

    fn words(&self, text: &str) -> Result<Vec<String>, CapabilityError> {
        let mut tokens = Vec::new();
        for chunk in text.split_whitespace() {
            tokenize_chunk(chunk, &mut tokens);
        }
        Ok(tokens)
    }
}

fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        if !matches!(chars[i], '.' | '!' | '?') {
            i += 1;
            continue;
        }

        let terminator_start = i;
        while i < chars.len() && matches!(chars[i], '.' | '!' | '?') {
            i += 1;
        }
        let terminator: String = chars[terminator_start..i].iter().collect();
        while i < chars.len() && CLOSING_MARKS.contains(&chars[i]) {
            i += 1;
        }

        let at_end = i >= chars.len();
        if !at_end && !chars[i].is_whitespace() {
            continue;
        }

        let next = chars[i..].iter().find(|c| !c.is_whitespace()).copied();
        if terminator == "." && ends_with_abbreviation(&chars[start..terminator_start]) {
            continue;
        }
        if terminator.starts_with("..") && next.is_some_and(char::is_lowercase) {
            continue;
        }

        push_sentence(&chars[start..i], &mut sentences);
        start = i;
    }

    push_sentence(&chars[start..], &mut sentences);
    sentences
}

fn push_sentence(chars: &[char], sentences: &mut Vec<String>) {
    let sentence: String = chars.iter().collect();
    let trimmed = sentence.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

fn ends_with_abbreviation(preceding: &[char]) -> bool {
    let word: String = preceding
        .iter()
        .rev()
        .take_while(|c| !c.is_whitespace())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let word = word
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    if word.is_empty() {
        return false;
    }
    let mut letters = word.chars();
    let single_initial =
        matches!((letters.next(), letters.next()), (Some(c), None) if c.is_alphabetic());
    single_initial || ABBREVIATIONS.contains(&word.as_str())
}

fn tokenize_chunk(chunk: &str, tokens: &mut Vec<String>) {
    let chars: Vec<char> = chunk.chars().collect();
    let is_word_char = |c: &char| c.is_alphanumeric() || *c == '_';

    let lead = chars.iter().take_while(|c| !is_word_char(c)).count();
    if lead == chars.len() {
        push_punctuation(&chars, tokens);
        return;
    }
    let trail = chars.iter().rev().take_while(|c| !is_word_char(c)).count();

    push_punctuation(&chars[..lead], tokens);
    let core: String = chars[lead..chars.len() - trail].iter().collect();
    split_contraction(&core, tokens);
    push_punctuation(&chars[chars.len() - trail..], tokens);
}

/// Runs of the same mark stay together (`...`, `!!`), anything else is one token per char.
fn push_punctuation(chars: &[char], tokens: &mut Vec<String>) {
    let mut i = 0;
    while i < chars.len() {
        let mark = chars[i];
        let mut j = i + 1;
        while j < chars.len() && chars[j] == mark {
            j += 1;
        }
        tokens.push(chars[i..j].iter().collect());
        i = j;
    }
}

fn split_contraction(core: &str, tokens: &mut Vec<String>) {
    let lower = core.to_lowercase();
    let normalized = lower.replace('\u{2019}', "'");

    if normalized.ends_with("n't") && normalized.chars().count() > 3 {
        let split_at = core.char_indices().rev().nth(2).map(|(index, _)| index);
        if let Some(index) = split_at {
            tokens.push(core[..index].to_string());
            tokens.push(core[index..].to_string());
            return;
        }
    }

    for suffix in CONTRACTION_SUFFIXES {
        if normalized.ends_with(suffix) && normalized.len() > suffix.len() {
            let suffix_chars = suffix.chars().count();
            if let Some((index, _)) = core.char_indices().rev().nth(suffix_chars - 1) {
                tokens.push(core[..index].to_string());
                tokens.push(core[index..].to_string());
                return;
            }
        }
    }

    tokens.push(core.to_string());
}
