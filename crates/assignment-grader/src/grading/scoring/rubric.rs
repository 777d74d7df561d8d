//! The fixed grading rubric as data: per metric, ordered bands whose first
//! match awards points, then a ceiling per dimension.

use serde::Serialize;

/// Points awarded to an empty coverage map; distinct from the lowest real band.
pub const COVERAGE_FALLBACK: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    ContentQuality,
    WritingStyle,
    CriteriaCoverage,
    TechnicalAccuracy,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::ContentQuality,
        Dimension::WritingStyle,
        Dimension::CriteriaCoverage,
        Dimension::TechnicalAccuracy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::ContentQuality => "Content quality",
            Dimension::WritingStyle => "Writing style",
            Dimension::CriteriaCoverage => "Criteria coverage",
            Dimension::TechnicalAccuracy => "Technical accuracy",
        }
    }

    pub fn ceiling(self) -> u32 {
        match self {
            Dimension::ContentQuality => 25,
            Dimension::WritingStyle => 30,
            Dimension::CriteriaCoverage => 25,
            Dimension::TechnicalAccuracy => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    WordCount,
    ReadabilityScore,
    ContentLexicalDiversity,
    TransitionWords,
    PassiveVoiceCount,
    AverageCoverage,
    GradeLevel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    AtLeast(f64),
    Above(f64),
    AtMost(f64),
    /// Inclusive on both ends.
    Between(f64, f64),
    /// Exclusive low, inclusive high.
    AboveAtMost(f64, f64),
    Always,
}

impl Bound {
    pub fn contains(&self, value: f64) -> bool {
        match *self {
            Bound::AtLeast(low) => value >= low,
            Bound::Above(low) => value > low,
            Bound::AtMost(high) => value <= high,
            Bound::Between(low, high) => (low..=high).contains(&value),
            Bound::AboveAtMost(low, high) => value > low && value <= high,
            Bound::Always => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub bound: Bound,
    pub points: u32,
}

const fn band(bound: Bound, points: u32) -> Band {
    Band { bound, points }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RubricRule {
    pub dimension: Dimension,
    pub metric: Metric,
    pub bands: &'static [Band],
}

impl RubricRule {
    /// Points from the first band containing `value`, or zero.
    pub fn award(&self, value: f64) -> u32 {
        self.bands
            .iter()
            .find(|band| band.bound.contains(value))
            .map_or(0, |band| band.points)
    }
}

pub const STANDARD_RUBRIC: &[RubricRule] = &[
    RubricRule {
        dimension: Dimension::ContentQuality,
        metric: Metric::WordCount,
        bands: &[
            band(Bound::AtLeast(1000.0), 25),
            band(Bound::AtLeast(500.0), 20),
            band(Bound::AtLeast(200.0), 15),
            band(Bound::AtLeast(100.0), 10),
        ],
    },
    RubricRule {
        dimension: Dimension::ContentQuality,
        metric: Metric::ReadabilityScore,
        bands: &[
            band(Bound::Above(80.0), 15),
            band(Bound::Above(60.0), 10),
            band(Bound::Above(40.0), 5),
        ],
    },
    RubricRule {
        dimension: Dimension::WritingStyle,
        metric: Metric::ContentLexicalDiversity,
        bands: &[
            band(Bound::Above(0.7), 12),
            band(Bound::Above(0.5), 8),
            band(Bound::Above(0.3), 4),
        ],
    },
    RubricRule {
        dimension: Dimension::WritingStyle,
        metric: Metric::TransitionWords,
        bands: &[
            band(Bound::AtLeast(10.0), 10),
            band(Bound::AtLeast(5.0), 7),
            band(Bound::AtLeast(2.0), 4),
        ],
    },
    RubricRule {
        dimension: Dimension::WritingStyle,
        metric: Metric::PassiveVoiceCount,
        bands: &[
            band(Bound::AtMost(2.0), 8),
            band(Bound::AtMost(5.0), 5),
            band(Bound::AtMost(8.0), 2),
        ],
    },
    RubricRule {
        dimension: Dimension::CriteriaCoverage,
        metric: Metric::AverageCoverage,
        bands: &[
            band(Bound::Above(0.9), 25),
            band(Bound::Above(0.7), 20),
            band(Bound::Above(0.5), 15),
            band(Bound::Above(0.3), 10),
            band(Bound::Always, 5),
        ],
    },
    RubricRule {
        dimension: Dimension::TechnicalAccuracy,
        metric: Metric::GradeLevel,
        bands: &[
            band(Bound::Between(6.0, 10.0), 10),
            band(Bound::AboveAtMost(10.0, 14.0), 7),
            band(Bound::AtMost(16.0), 4),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(metric: Metric) -> &'static RubricRule {
        STANDARD_RUBRIC
            .iter()
            .find(|rule| rule.metric == metric)
            .expect("metric present in rubric")
    }

    #[test]
    fn word_count_bands_are_inclusive_lower_bounds() {
        let rule = rule(Metric::WordCount);
        assert_eq!(rule.award(99.0), 0);
        assert_eq!(rule.award(100.0), 10);
        assert_eq!(rule.award(499.0), 15);
        assert_eq!(rule.award(500.0), 20);
        assert_eq!(rule.award(1000.0), 25);
    }

    #[test]
    fn readability_bands_are_exclusive() {
        let rule = rule(Metric::ReadabilityScore);
        assert_eq!(rule.award(40.0), 0);
        assert_eq!(rule.award(60.0), 5);
        assert_eq!(rule.award(80.5), 15);
    }

    #[test]
    fn passive_voice_rewards_restraint() {
        let rule = rule(Metric::PassiveVoiceCount);
        assert_eq!(rule.award(0.0), 8);
        assert_eq!(rule.award(3.0), 5);
        assert_eq!(rule.award(8.0), 2);
        assert_eq!(rule.award(9.0), 0);
    }

    #[test]
    fn grade_level_bands_cover_low_grades() {
        let rule = rule(Metric::GradeLevel);
        assert_eq!(rule.award(0.0), 4);
        assert_eq!(rule.award(6.0), 10);
        assert_eq!(rule.award(10.0), 10);
        assert_eq!(rule.award(10.5), 7);
        assert_eq!(rule.award(15.0), 4);
        assert_eq!(rule.award(16.5), 0);
    }

    #[test]
    fn coverage_floor_is_the_fallback_value() {
        let rule = rule(Metric::AverageCoverage);
        assert_eq!(rule.award(-0.4), COVERAGE_FALLBACK);
        assert_eq!(rule.award(0.31), 10);
        assert_eq!(rule.award(0.95), 25);
    }

    #[test]
    fn every_dimension_has_a_rule() {
        for dimension in Dimension::ALL {
            assert!(STANDARD_RUBRIC.iter().any(|rule| rule.dimension == dimension));
        }
    }
}
