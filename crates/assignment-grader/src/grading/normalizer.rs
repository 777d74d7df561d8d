//! Cleanup applied to extracted text before any analysis.
//!
//! Two repairs here are narrow workarounds for layout extraction artifacts and
//! are kept exactly as scoped: the split of a word-initial lowercase letter
//! from a following capital, and the `triad` -> `triad_word` substitution.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::domain::NormalizedText;

static DISALLOWED_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[^\w\s.!?,;:\-()"']"#).expect("valid character filter"));

static RUN_TOGETHER_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([a-z])([A-Z])").expect("valid boundary pattern"));

static TRIAD_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\btriad\b").expect("valid triad pattern"));

/// Normalize raw extracted text. Never fails; empty input yields empty output.
pub fn normalize(raw: &str) -> NormalizedText {
    if raw.trim().is_empty() {
        return NormalizedText::default();
    }

    let filtered = DISALLOWED_CHARS.replace_all(raw, "");
    let split = split_run_together_words(&filtered);
    let substituted = TRIAD_TOKEN.replace_all(&split, "triad_word");
    let collapsed = collapse_whitespace(&substituted);

    debug!(raw_len = raw.len(), normalized_len = collapsed.len(), "normalized text");
    NormalizedText(collapsed)
}

/// `iPhone` -> `i Phone`; only a lowercase letter at the start of a word is split off.
fn split_run_together_words(text: &str) -> String {
    RUN_TOGETHER_WORDS.replace_all(text, "$1 $2").into_owned()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_trims() {
        let text = normalize("  Hello,\n\n   world\t again.  ");
        assert_eq!(text.as_str(), "Hello, world again.");
    }

    #[test]
    fn removes_characters_outside_allowed_set() {
        let text = normalize("Cost: $40 @ store #3 (approx) -- \"ok\" it's *fine*");
        assert_eq!(text.as_str(), "Cost: 40 store 3 (approx) -- \"ok\" it's fine");
    }

    #[test]
    fn removal_never_leaves_double_spaces() {
        let text = normalize("alpha @ beta");
        assert_eq!(text.as_str(), "alpha beta");
    }

    #[test]
    fn splits_word_initial_lowercase_from_capital() {
        assert_eq!(normalize("the iPhone launch").as_str(), "the i Phone launch");
        assert_eq!(normalize("camelCase stays").as_str(), "camelCase stays");
    }

    #[test]
    fn replaces_triad_token_case_insensitively() {
        let text = normalize("The CIA Triad and triads of triad.");
        assert_eq!(text.as_str(), "The CIA triad_word and triads of triad_word.");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(normalize("").is_empty());
        assert!(normalize(" \n\t ").is_empty());
        assert!(normalize("@#$%").is_empty());
    }

    #[test]
    fn normalizing_is_idempotent() {
        let samples = [
            "Plain sentence.",
            "x@Y and aB  c\n\nTriad triad_word",
            "  weird\u{00a0}spacing — dash © symbols  ",
            "iPhone iPad eBay",
            "",
        ];

        for sample in samples {
            let once = normalize(sample);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn keeps_unicode_letters() {
        assert_eq!(normalize("café naïve").as_str(), "café naïve");
    }
}
