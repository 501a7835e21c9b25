//! The nine trend-template criteria.
//!
//! Each check is total: a missing input makes that criterion fail as
//! "not evaluated" instead of panicking, so the scorer can tell a low score
//! apart from an incomplete one.

use serde::{Deserialize, Serialize};

use super::config::TemplateConfig;
use super::indicator_set::IndicatorSet;

/// Number of criteria in the template.
pub const CRITERION_COUNT: usize = 9;

/// One trend-template check. Order is fixed and used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    PriceAboveMediumSma,
    PriceAboveLongSma,
    MediumSmaAboveLongSma,
    LongSmaTrendingUp,
    ShortSmaAboveMediumSma,
    ShortSmaAboveLongSma,
    PriceAboveShortSma,
    AboveRangeLow,
    NearRangeHigh,
}

impl Criterion {
    pub const ALL: [Criterion; CRITERION_COUNT] = [
        Criterion::PriceAboveMediumSma,
        Criterion::PriceAboveLongSma,
        Criterion::MediumSmaAboveLongSma,
        Criterion::LongSmaTrendingUp,
        Criterion::ShortSmaAboveMediumSma,
        Criterion::ShortSmaAboveLongSma,
        Criterion::PriceAboveShortSma,
        Criterion::AboveRangeLow,
        Criterion::NearRangeHigh,
    ];

    /// Fixed identifier, 1..=9.
    pub fn id(self) -> u8 {
        match self {
            Criterion::PriceAboveMediumSma => 1,
            Criterion::PriceAboveLongSma => 2,
            Criterion::MediumSmaAboveLongSma => 3,
            Criterion::LongSmaTrendingUp => 4,
            Criterion::ShortSmaAboveMediumSma => 5,
            Criterion::ShortSmaAboveLongSma => 6,
            Criterion::PriceAboveShortSma => 7,
            Criterion::AboveRangeLow => 8,
            Criterion::NearRangeHigh => 9,
        }
    }

    /// Stable machine-readable key.
    pub fn key(self) -> &'static str {
        match self {
            Criterion::PriceAboveMediumSma => "price_above_sma150",
            Criterion::PriceAboveLongSma => "price_above_sma200",
            Criterion::MediumSmaAboveLongSma => "sma150_above_sma200",
            Criterion::LongSmaTrendingUp => "sma200_trending_up",
            Criterion::ShortSmaAboveMediumSma => "sma50_above_sma150",
            Criterion::ShortSmaAboveLongSma => "sma50_above_sma200",
            Criterion::PriceAboveShortSma => "price_above_sma50",
            Criterion::AboveRangeLow => "price_30pct_above_52w_low",
            Criterion::NearRangeHigh => "price_within_25pct_of_52w_high",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Criterion::PriceAboveMediumSma => "Price > 150-day SMA",
            Criterion::PriceAboveLongSma => "Price > 200-day SMA",
            Criterion::MediumSmaAboveLongSma => "150-day SMA > 200-day SMA",
            Criterion::LongSmaTrendingUp => "200-day SMA trending up for 1+ month",
            Criterion::ShortSmaAboveMediumSma => "50-day SMA > 150-day SMA",
            Criterion::ShortSmaAboveLongSma => "50-day SMA > 200-day SMA",
            Criterion::PriceAboveShortSma => "Price > 50-day SMA",
            Criterion::AboveRangeLow => "Price at least 30% above 52-week low",
            Criterion::NearRangeHigh => "Price within 25% of 52-week high",
        }
    }

    /// Whether the check depends on the 52-week range.
    pub fn uses_range(self) -> bool {
        matches!(self, Criterion::AboveRangeLow | Criterion::NearRangeHigh)
    }
}

/// Outcome of a single criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionResult {
    pub criterion: Criterion,
    pub passed: bool,
    /// False when a required indicator was undefined.
    pub evaluated: bool,
    /// Range-based check computed over less than a full lookback.
    pub low_confidence: bool,
}

/// Evaluate all nine criteria in fixed order.
pub fn evaluate_criteria(
    set: &IndicatorSet,
    config: &TemplateConfig,
) -> [CriterionResult; CRITERION_COUNT] {
    Criterion::ALL.map(|criterion| {
        let outcome = check(criterion, set, config);
        let evaluated = outcome.is_some();
        CriterionResult {
            criterion,
            passed: outcome.unwrap_or(false),
            evaluated,
            low_confidence: evaluated && criterion.uses_range() && !set.range_complete,
        }
    })
}

/// `None` when an input is undefined.
fn check(criterion: Criterion, set: &IndicatorSet, config: &TemplateConfig) -> Option<bool> {
    let price = set.price?;
    Some(match criterion {
        Criterion::PriceAboveMediumSma => price > set.sma_medium?,
        Criterion::PriceAboveLongSma => price > set.sma_long?,
        Criterion::MediumSmaAboveLongSma => set.sma_medium? > set.sma_long?,
        Criterion::LongSmaTrendingUp => set.sma_long? > set.sma_long_prior?,
        Criterion::ShortSmaAboveMediumSma => set.sma_short? > set.sma_medium?,
        Criterion::ShortSmaAboveLongSma => set.sma_short? > set.sma_long?,
        Criterion::PriceAboveShortSma => price > set.sma_short?,
        Criterion::AboveRangeLow => price >= set.range_low? * config.low_multiplier(),
        Criterion::NearRangeHigh => price >= set.range_high? * config.high_multiplier(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(price: f64) -> IndicatorSet {
        IndicatorSet {
            price: Some(price),
            sma_short: Some(95.0),
            sma_medium: Some(90.0),
            sma_long: Some(85.0),
            sma_long_prior: Some(80.0),
            range_high: Some(110.0),
            range_low: Some(60.0),
            range_bars: 252,
            range_complete: true,
        }
    }

    #[test]
    fn ids_are_one_through_nine_in_order() {
        let ids: Vec<u8> = Criterion::ALL.iter().map(|c| c.id()).collect();
        assert_eq!(ids, (1..=9).collect::<Vec<u8>>());
    }

    #[test]
    fn keys_are_unique() {
        let mut keys: Vec<&str> = Criterion::ALL.iter().map(|c| c.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), CRITERION_COUNT);
    }

    #[test]
    fn healthy_uptrend_passes_everything() {
        let results = evaluate_criteria(&set(100.0), &TemplateConfig::default());
        assert!(results.iter().all(|r| r.passed && r.evaluated && !r.low_confidence));
    }

    #[test]
    fn price_below_short_sma_fails_only_criterion_7() {
        let results = evaluate_criteria(&set(94.0), &TemplateConfig::default());
        let failed: Vec<u8> = results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.criterion.id())
            .collect();
        assert_eq!(failed, vec![7]);
    }

    #[test]
    fn flat_long_sma_is_not_an_uptrend() {
        let mut s = set(100.0);
        s.sma_long_prior = s.sma_long;
        let results = evaluate_criteria(&s, &TemplateConfig::default());
        assert!(!results[3].passed);
        assert!(results[3].evaluated);
    }

    #[test]
    fn range_boundaries_are_inclusive() {
        let config = TemplateConfig::default();

        // Exactly 30% above the low.
        let mut s = set(130.0);
        s.range_low = Some(100.0);
        s.range_high = Some(130.0);
        let results = evaluate_criteria(&s, &config);
        assert!(results[7].passed, "price == low * 1.30 must pass");

        // Exactly 25% below the high.
        let mut s = set(150.0);
        s.range_high = Some(200.0);
        let results = evaluate_criteria(&s, &config);
        assert!(results[8].passed, "price == high * 0.75 must pass");

        // Just under each boundary fails.
        let mut s = set(129.99);
        s.range_low = Some(100.0);
        assert!(!evaluate_criteria(&s, &config)[7].passed);
        let mut s = set(149.99);
        s.range_high = Some(200.0);
        assert!(!evaluate_criteria(&s, &config)[8].passed);
    }

    #[test]
    fn undefined_inputs_are_not_evaluated() {
        let mut s = set(100.0);
        s.sma_long_prior = None;
        s.sma_short = None;
        let results = evaluate_criteria(&s, &TemplateConfig::default());

        let unevaluated: Vec<u8> = results
            .iter()
            .filter(|r| !r.evaluated)
            .map(|r| r.criterion.id())
            .collect();
        assert_eq!(unevaluated, vec![4, 5, 6, 7]);
        assert!(results.iter().filter(|r| !r.evaluated).all(|r| !r.passed));
    }

    #[test]
    fn missing_price_evaluates_nothing() {
        let mut s = set(100.0);
        s.price = None;
        let results = evaluate_criteria(&s, &TemplateConfig::default());
        assert!(results.iter().all(|r| !r.evaluated && !r.passed));
    }

    #[test]
    fn short_range_flags_low_confidence() {
        let mut s = set(100.0);
        s.range_complete = false;
        s.range_bars = 230;
        let results = evaluate_criteria(&s, &TemplateConfig::default());
        for r in &results {
            assert_eq!(r.low_confidence, r.criterion.uses_range());
        }
    }
}
