//! The four independent analyzers. Each is a pure function of the normalized
//! text (and criteria, for coverage) plus the capability bundle, and never
//! fails: a capability error degrades that analyzer's output to its default.

mod quality;
mod semantic;
mod style;
mod tone;

pub use quality::analyze_quality;
pub use semantic::{analyze_coverage, RELEVANCE_THRESHOLD};
pub use style::analyze_style;
pub use tone::{analyze_tone, CHUNK_CHARS};

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
