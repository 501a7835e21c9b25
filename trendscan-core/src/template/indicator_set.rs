//! IndicatorSet: the per-symbol snapshot every criterion reads from.

use serde::{Deserialize, Serialize};

use crate::indicators::{defined_at, Indicator, RollingExtreme, Sma};

use super::config::TemplateConfig;

/// Indicator values at the last close of a series.
///
/// `None` means undefined: not enough history for that value. The set is
/// derived on every evaluation and never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub price: Option<f64>,
    pub sma_short: Option<f64>,
    pub sma_medium: Option<f64>,
    pub sma_long: Option<f64>,
    /// Long SMA `trend_lookback` bars before the last close.
    pub sma_long_prior: Option<f64>,
    pub range_high: Option<f64>,
    pub range_low: Option<f64>,
    /// Closes covered by the range high/low.
    pub range_bars: usize,
    /// False when fewer than `range_lookback` closes were available.
    pub range_complete: bool,
}

impl IndicatorSet {
    /// Compute every template indicator from ascending closes.
    pub fn compute(closes: &[f64], config: &TemplateConfig) -> Self {
        let n = closes.len();
        let Some(last) = n.checked_sub(1) else {
            return Self::empty();
        };

        let sma_short = Sma::new(config.short_window).latest(closes).ok();
        let sma_medium = Sma::new(config.medium_window).latest(closes).ok();

        let long_series = Sma::new(config.long_window).compute(closes);
        let sma_long = defined_at(&long_series, last);
        let sma_long_prior = last
            .checked_sub(config.trend_lookback)
            .and_then(|i| defined_at(&long_series, i));

        // With less than a full year of history the range covers what exists.
        let range_bars = n.min(config.range_lookback);
        let range_high = RollingExtreme::max(range_bars).latest(closes).ok();
        let range_low = RollingExtreme::min(range_bars).latest(closes).ok();

        Self {
            price: defined_at(closes, last),
            sma_short,
            sma_medium,
            sma_long,
            sma_long_prior,
            range_high,
            range_low,
            range_bars,
            range_complete: range_bars >= config.range_lookback,
        }
    }

    fn empty() -> Self {
        Self {
            price: None,
            sma_short: None,
            sma_medium: None,
            sma_long: None,
            sma_long_prior: None,
            range_high: None,
            range_low: None,
            range_bars: 0,
            range_complete: false,
        }
    }

    /// Percentage the price sits above the range low.
    pub fn pct_above_low(&self) -> Option<f64> {
        match (self.price, self.range_low) {
            (Some(p), Some(low)) if low > 0.0 => Some((p - low) / low * 100.0),
            _ => None,
        }
    }

    /// Percentage the price sits below the range high.
    pub fn pct_below_high(&self) -> Option<f64> {
        match (self.price, self.range_high) {
            (Some(p), Some(high)) if high > 0.0 => Some((high - p) / high * 100.0),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    fn small_config() -> TemplateConfig {
        TemplateConfig {
            short_window: 2,
            medium_window: 3,
            long_window: 4,
            trend_lookback: 2,
            range_lookback: 5,
            ..Default::default()
        }
    }

    #[test]
    fn empty_series_is_all_undefined() {
        let set = IndicatorSet::compute(&[], &small_config());
        assert_eq!(set.price, None);
        assert_eq!(set.sma_long, None);
        assert_eq!(set.range_bars, 0);
        assert!(!set.range_complete);
        assert_eq!(set.pct_above_low(), None);
    }

    #[test]
    fn full_history_defines_everything() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let set = IndicatorSet::compute(&closes, &small_config());

        assert_eq!(set.price, Some(7.0));
        assert_approx(set.sma_short.unwrap(), 6.5, DEFAULT_EPSILON);
        assert_approx(set.sma_medium.unwrap(), 6.0, DEFAULT_EPSILON);
        assert_approx(set.sma_long.unwrap(), 5.5, DEFAULT_EPSILON);
        // Two bars back: mean(2,3,4,5)
        assert_approx(set.sma_long_prior.unwrap(), 3.5, DEFAULT_EPSILON);
        assert_eq!(set.range_high, Some(7.0));
        assert_eq!(set.range_low, Some(3.0));
        assert_eq!(set.range_bars, 5);
        assert!(set.range_complete);
    }

    #[test]
    fn prior_long_sma_undefined_without_enough_history() {
        // 5 closes: long SMA defined at index 3 and 4, prior (index 2) is not.
        let set = IndicatorSet::compute(&[1.0, 2.0, 3.0, 4.0, 5.0], &small_config());
        assert!(set.sma_long.is_some());
        assert_eq!(set.sma_long_prior, None);
    }

    #[test]
    fn short_history_range_uses_available_closes() {
        let set = IndicatorSet::compute(&[4.0, 2.0, 3.0], &small_config());
        assert_eq!(set.range_bars, 3);
        assert!(!set.range_complete);
        assert_eq!(set.range_high, Some(4.0));
        assert_eq!(set.range_low, Some(2.0));
    }

    #[test]
    fn range_percentages() {
        let set = IndicatorSet {
            price: Some(90.0),
            range_high: Some(100.0),
            range_low: Some(60.0),
            ..IndicatorSet::empty()
        };
        assert_approx(set.pct_above_low().unwrap(), 50.0, DEFAULT_EPSILON);
        assert_approx(set.pct_below_high().unwrap(), 10.0, DEFAULT_EPSILON);
    }
}
