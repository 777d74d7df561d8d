use super::tokenizer::is_alphanumeric_token;
use super::{CapabilityError, CapabilityKind, DependencyParser, RuleTokenizer, TextTokenizer};
use crate::grading::lexicon::{
    ADVERB_FILLERS, BE_FORMS, IRREGULAR_PARTICIPLES, PARTICIPLE_EXCEPTIONS,
};

const MAX_FILLERS: usize = 2;
const AUXILIARIES: &[&str] = &[
    "has", "have", "had", "will", "would", "can", "could", "shall", "should", "may", "might",
    "must", "to",
];

/// Approximates passive-subject detection: a form of *be*, at most two adverbs,
/// then a past participle marks the nearest preceding word in the same
/// sentence as a passive subject.
#[derive(Debug, Clone, Default)]
pub struct PassiveHeuristicParser {
    tokenizer: RuleTokenizer,
}

impl DependencyParser for PassiveHeuristicParser {
    fn passive_subject_flags(&self, text: &str) -> Result<Vec<bool>, CapabilityError> {
        let tokens = self
            .tokenizer
            .words(&text.to_lowercase())
            .map_err(|err| CapabilityError::failed(CapabilityKind::Parser, err))?;
        let mut flags = vec![false; tokens.len()];

        for (index, token) in tokens.iter().enumerate() {
            if !BE_FORMS.contains(&token.as_str()) {
                continue;
            }
            if participle_after(&tokens, index + 1).is_none() {
                continue;
            }
            if let Some(subject) = subject_before(&tokens, index) {
                flags[subject] = true;
            }
        }

        Ok(flags)
    }
}

fn participle_after(tokens: &[String], mut position: usize) -> Option<usize> {
    let mut fillers = 0;
    while let Some(token) = tokens.get(position) {
        if is_participle(token) {
            return Some(position);
        }
        if fillers < MAX_FILLERS && is_filler(token) {
            fillers += 1;
            position += 1;
            continue;
        }
        return None;
    }
    None
}

fn subject_before(tokens: &[String], be_index: usize) -> Option<usize> {
    tokens[..be_index]
        .iter()
        .enumerate()
        .rev()
        .take_while(|(_, token)| !matches!(token.as_str(), "." | "!" | "?" | ";"))
        .find(|(_, token)| {
            is_alphanumeric_token(token)
                && !BE_FORMS.contains(&token.as_str())
                && !AUXILIARIES.contains(&token.as_str())
                && !is_filler(token)
        })
        .map(|(index, _)| index)
}

fn is_filler(token: &str) -> bool {
    ADVERB_FILLERS.contains(&token) || (token.len() > 4 && token.ends_with("ly"))
}

fn is_participle(token: &str) -> bool {
    if IRREGULAR_PARTICIPLES.contains(&token) {
        return true;
    }
    is_alphanumeric_token(token)
        && token.len() > 3
        && (token.ends_with("ed") || token.ends_with("en"))
        && !PARTICIPLE_EXCEPTIONS.contains(&token)
}
