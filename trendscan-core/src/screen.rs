//! Single-symbol evaluation against the trend template.
//!
//! `evaluate()` is pure: the same series and config always produce an
//! identical `ScreenResult`. The result timestamp is the date of the last
//! close, not the wall clock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;
use crate::template::{
    evaluate_criteria, verdict, CriterionResult, IndicatorSet, TemplateConfig, Verdict,
};

/// Whether all nine criteria could be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Completeness {
    Complete,
    Incomplete {
        evaluated: usize,
        available_bars: usize,
        required_bars: usize,
    },
}

impl Completeness {
    pub fn is_complete(&self) -> bool {
        matches!(self, Completeness::Complete)
    }
}

/// Outcome of screening one symbol. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenResult {
    pub symbol: String,
    /// Date of the last close evaluated.
    pub as_of: Option<NaiveDate>,
    pub score: u8,
    pub verdict: Verdict,
    pub qualifies: bool,
    pub completeness: Completeness,
    pub criteria: Vec<CriterionResult>,
    pub indicators: IndicatorSet,
}

impl ScreenResult {
    pub fn is_near_miss(&self) -> bool {
        self.verdict == Verdict::NearMiss
    }

    pub fn is_perfect(&self) -> bool {
        self.verdict == Verdict::Perfect
    }

    /// True if any range-based criterion was computed on short history.
    pub fn has_low_confidence(&self) -> bool {
        self.criteria.iter().any(|c| c.low_confidence)
    }

    /// Criteria that did not pass (including unevaluated ones).
    pub fn failed_criteria(&self) -> impl Iterator<Item = &CriterionResult> {
        self.criteria.iter().filter(|c| !c.passed)
    }
}

/// Screen one symbol's series.
///
/// Never panics on short or empty series: missing history yields an
/// `Incomplete` result.
///
/// # Panics
///
/// Panics if `config` has a zero-length window. Configs that pass
/// [`TemplateConfig::validate`] never do.
pub fn evaluate(symbol: &str, series: &PriceSeries, config: &TemplateConfig) -> ScreenResult {
    let closes = series.closes();
    let indicators = IndicatorSet::compute(&closes, config);
    let criteria = evaluate_criteria(&indicators, config);
    let (score, verdict) = verdict(&criteria, config);

    let evaluated = criteria.iter().filter(|c| c.evaluated).count();
    let completeness = if verdict == Verdict::Incomplete {
        Completeness::Incomplete {
            evaluated,
            available_bars: closes.len(),
            required_bars: config.required_history(),
        }
    } else {
        Completeness::Complete
    };

    ScreenResult {
        symbol: symbol.to_string(),
        as_of: series.last().map(|p| p.date),
        score,
        verdict,
        qualifies: verdict.qualifies(),
        completeness,
        criteria: criteria.to_vec(),
        indicators,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::CRITERION_COUNT;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
    }

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes("TEST", start(), closes).unwrap()
    }

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 * 1.004_f64.powi(i as i32)).collect()
    }

    #[test]
    fn rising_series_is_perfect() {
        let result = evaluate("TEST", &series(&rising(300)), &TemplateConfig::default());
        assert_eq!(result.score, 9);
        assert_eq!(result.verdict, Verdict::Perfect);
        assert!(result.qualifies);
        assert!(result.completeness.is_complete());
        assert!(!result.has_low_confidence());
        assert_eq!(result.criteria.len(), CRITERION_COUNT);
    }

    #[test]
    fn short_series_is_incomplete() {
        let result = evaluate("TEST", &series(&rising(120)), &TemplateConfig::default());
        assert_eq!(result.verdict, Verdict::Incomplete);
        assert!(!result.qualifies);
        assert_eq!(
            result.completeness,
            Completeness::Incomplete {
                evaluated: 3,
                available_bars: 120,
                required_bars: 221,
            }
        );
    }

    #[test]
    fn empty_series_is_incomplete() {
        let empty = PriceSeries::new("TEST", Vec::new()).unwrap();
        let result = evaluate("TEST", &empty, &TemplateConfig::default());
        assert_eq!(result.score, 0);
        assert_eq!(result.as_of, None);
        assert!(matches!(
            result.completeness,
            Completeness::Incomplete { evaluated: 0, .. }
        ));
    }

    #[test]
    fn between_required_and_full_year_is_low_confidence() {
        let result = evaluate("TEST", &series(&rising(230)), &TemplateConfig::default());
        assert!(result.completeness.is_complete());
        assert!(result.has_low_confidence());
        assert_eq!(result.indicators.range_bars, 230);
    }

    #[test]
    fn as_of_is_last_date() {
        let result = evaluate("TEST", &series(&rising(5)), &TemplateConfig::default());
        assert_eq!(result.as_of, Some(start() + chrono::Duration::days(4)));
    }

    #[test]
    fn result_serializes() {
        let result = evaluate("TEST", &series(&rising(260)), &TemplateConfig::default());
        let json = serde_json::to_string(&result).unwrap();
        let back: ScreenResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.symbol, result.symbol);
        assert_eq!(back.score, result.score);
        assert_eq!(back.verdict, result.verdict);
        assert_eq!(back.criteria, result.criteria);
        assert!(json.contains("\"verdict\":\"perfect\""));
    }
}
