//! Scoring: criterion count and qualification verdict.

use serde::{Deserialize, Serialize};

use super::config::TemplateConfig;
use super::criteria::{CriterionResult, CRITERION_COUNT};

/// Classification of a scored result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Score equals `perfect_score`.
    Perfect,
    /// Score at or above `min_score`.
    Qualifies,
    /// Score within `near_miss_band` below `min_score`.
    NearMiss,
    Fails,
    /// Not every criterion could be evaluated.
    Incomplete,
}

impl Verdict {
    pub fn qualifies(self) -> bool {
        matches!(self, Verdict::Perfect | Verdict::Qualifies)
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::Perfect => "PERFECT MATCH",
            Verdict::Qualifies => "QUALIFIES",
            Verdict::NearMiss => "NEAR MISS",
            Verdict::Fails => "FAILS",
            Verdict::Incomplete => "INCOMPLETE",
        }
    }
}

/// Number of passed criteria.
pub fn score(results: &[CriterionResult]) -> u8 {
    results.iter().filter(|r| r.passed).count() as u8
}

/// Classify a score that was computed from a complete evaluation.
pub fn classify(score: u8, config: &TemplateConfig) -> Verdict {
    if score == config.perfect_score {
        Verdict::Perfect
    } else if score >= config.min_score {
        Verdict::Qualifies
    } else if score >= config.near_miss_floor() {
        Verdict::NearMiss
    } else {
        Verdict::Fails
    }
}

/// Score and classify a full set of criterion results.
pub fn verdict(results: &[CriterionResult], config: &TemplateConfig) -> (u8, Verdict) {
    let s = score(results);
    let evaluated = results.iter().filter(|r| r.evaluated).count();
    if evaluated < CRITERION_COUNT {
        return (s, Verdict::Incomplete);
    }
    (s, classify(s, config))
}
