//! Fixed word lists shared by the analyzers and built-in capabilities.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Transition vocabulary; presence in the lowercased text counts once per word.
pub const TRANSITION_WORDS: [&str; 20] = [
    "however",
    "therefore",
    "furthermore",
    "moreover",
    "additionally",
    "consequently",
    "nevertheless",
    "nonetheless",
    "meanwhile",
    "subsequently",
    "similarly",
    "likewise",
    "conversely",
    "alternatively",
    "specifically",
    "particularly",
    "especially",
    "notably",
    "importantly",
    "significantly",
];

const STOPWORD_LIST: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// English stopwords used to separate content words from function words.
pub static STOPWORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOPWORD_LIST.iter().copied().collect());

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Lowercased abbreviations (without the trailing period) that do not end a sentence.
pub const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "fig", "no",
    "vol", "approx", "dept", "inc", "ltd", "co", "corp", "jan", "feb", "mar", "apr", "jun",
    "jul", "aug", "sep", "sept", "oct", "nov", "dec", "al", "cf", "ca", "p", "pp", "ed", "eds",
    "a.m", "p.m",
];

pub const BE_FORMS: &[&str] = &["am", "is", "are", "was", "were", "be", "been", "being"];

/// Common irregular past participles that do not end in `-ed`/`-en`.
pub const IRREGULAR_PARTICIPLES: &[&str] = &[
    "built", "bought", "brought", "caught", "cut", "dealt", "felt", "found", "held", "hit",
    "hurt", "kept", "laid", "led", "left", "lent", "lost", "made", "meant", "met", "paid", "put",
    "read", "said", "sent", "set", "shut", "sold", "sought", "spent", "split", "spread", "stood",
    "struck", "taught", "thought", "told", "understood", "won", "wound", "done", "gone", "seen",
    "shown", "known", "grown", "drawn", "thrown", "sung", "begun", "run",
];

/// Words ending in `-ed`/`-en` that are rarely participles after a form of *be*.
pub const PARTICIPLE_EXCEPTIONS: &[&str] = &[
    "often", "even", "open", "seven", "eleven", "ten", "then", "when", "children", "garden",
    "golden", "hidden", "sudden", "token", "women", "men", "need", "seed", "speed", "indeed",
    "red", "bed", "feed", "shed", "ashamed", "afraid", "used", "supposed",
];

pub const ADVERB_FILLERS: &[&str] = &[
    "not", "also", "often", "always", "never", "usually", "then", "still", "being", "widely",
    "largely", "generally", "further", "commonly", "rarely", "frequently", "sometimes",
];

pub const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "positive", "benefit", "benefits", "beneficial", "improve",
    "improved", "improves", "improvement", "success", "successful", "effective", "efficient",
    "strong", "strength", "love", "loved", "enjoy", "enjoyed", "happy", "helpful", "valuable",
    "advantage", "advantages", "best", "better", "clear", "innovative", "promising", "robust",
    "wonderful", "remarkable", "impressive", "favorable", "popular", "prefer", "support",
    "supports", "well", "gain", "gains", "growth", "opportunity", "opportunities", "safe",
    "reliable", "easy", "accurate", "progress", "achieve", "achieved", "achievement", "hope",
    "creative", "fair", "healthy", "rich", "win", "wins", "thrive", "thriving", "inspiring",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "bad", "poor", "negative", "harm", "harmful", "damage", "damaging", "risk", "risks", "fail",
    "failed", "fails", "failure", "problem", "problems", "difficult", "difficulty", "weak",
    "weakness", "hate", "hated", "sad", "angry", "worse", "worst", "threat", "threats", "danger",
    "dangerous", "loss", "losses", "crisis", "conflict", "unfortunately", "decline", "declining",
    "error", "errors", "wrong", "unsafe", "unreliable", "expensive", "costly", "waste", "toxic",
    "pollution", "violence", "disease", "death", "suffer", "suffering", "fear", "concern",
    "concerns", "lack", "lacks", "inadequate", "ineffective", "corrupt", "abuse", "attack",
];

pub const NEGATIONS: &[&str] = &[
    "not", "no", "never", "n't", "cannot", "hardly", "without", "nor", "neither",
];
