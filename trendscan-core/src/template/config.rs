//! Trend-template configuration: windows, thresholds, scoring bands.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::criteria::CRITERION_COUNT;

/// Validation errors for a [`TemplateConfig`].
///
/// These are fatal at startup: a run with an invalid configuration is
/// rejected before any symbol is screened.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be >= 1")]
    ZeroWindow { field: &'static str },

    #[error(
        "moving-average windows must be strictly increasing (short {short} < medium {medium} < long {long})"
    )]
    WindowOrder {
        short: usize,
        medium: usize,
        long: usize,
    },

    #[error("{field} must be a finite percentage in [0, {max}), got {value}")]
    InvalidPercent {
        field: &'static str,
        value: f64,
        max: f64,
    },

    #[error("perfect_score must be in 1..=9, got {0}")]
    PerfectScore(u8),

    #[error("min_score must be in 1..=perfect_score ({perfect}), got {min}")]
    MinScore { min: u8, perfect: u8 },

    #[error("near_miss_band ({band}) must be smaller than min_score ({min})")]
    NearMissBand { band: u8, min: u8 },
}

/// Every tunable of the trend template.
///
/// Defaults follow the classic template: 50/150/200-day averages, a one-month
/// (21 trading days) uptrend check on the long average, a 252-day range,
/// 30% above the low and within 25% of the high.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub short_window: usize,
    pub medium_window: usize,
    pub long_window: usize,
    /// Bars between the current and the "prior" long average.
    pub trend_lookback: usize,
    /// Bars covered by the 52-week high/low.
    pub range_lookback: usize,
    /// Minimum % above the range low (criterion 8).
    pub min_above_low_pct: f64,
    /// Maximum % below the range high (criterion 9).
    pub max_below_high_pct: f64,
    /// Score at or above which a result qualifies.
    pub min_score: u8,
    /// Scores in `[min_score - near_miss_band, min_score - 1]` are near misses.
    pub near_miss_band: u8,
    /// Score classified as a perfect match.
    pub perfect_score: u8,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            short_window: 50,
            medium_window: 150,
            long_window: 200,
            trend_lookback: 21,
            range_lookback: 252,
            min_above_low_pct: 30.0,
            max_below_high_pct: 25.0,
            min_score: 7,
            near_miss_band: 2,
            perfect_score: CRITERION_COUNT as u8,
        }
    }
}

impl TemplateConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("short_window", self.short_window),
            ("medium_window", self.medium_window),
            ("long_window", self.long_window),
            ("trend_lookback", self.trend_lookback),
            ("range_lookback", self.range_lookback),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroWindow { field });
            }
        }

        if !(self.short_window < self.medium_window && self.medium_window < self.long_window) {
            return Err(ConfigError::WindowOrder {
                short: self.short_window,
                medium: self.medium_window,
                long: self.long_window,
            });
        }

        check_percent("min_above_low_pct", self.min_above_low_pct, f64::INFINITY)?;
        check_percent("max_below_high_pct", self.max_below_high_pct, 100.0)?;

        if self.perfect_score == 0 || self.perfect_score as usize > CRITERION_COUNT {
            return Err(ConfigError::PerfectScore(self.perfect_score));
        }
        if self.min_score == 0 || self.min_score > self.perfect_score {
            return Err(ConfigError::MinScore {
                min: self.min_score,
                perfect: self.perfect_score,
            });
        }
        if self.near_miss_band >= self.min_score {
            return Err(ConfigError::NearMissBand {
                band: self.near_miss_band,
                min: self.min_score,
            });
        }

        Ok(())
    }

    /// Closes needed before every criterion can be evaluated.
    ///
    /// The prior long average sits `trend_lookback` bars back and itself needs
    /// `long_window` closes. The 52-week range is not required: with less
    /// history it falls back to what is available.
    pub fn required_history(&self) -> usize {
        self.long_window + self.trend_lookback
    }

    /// Multiplier applied to the range low for criterion 8 (1.30 by default).
    pub fn low_multiplier(&self) -> f64 {
        1.0 + self.min_above_low_pct / 100.0
    }

    /// Multiplier applied to the range high for criterion 9 (0.75 by default).
    pub fn high_multiplier(&self) -> f64 {
        1.0 - self.max_below_high_pct / 100.0
    }

    /// Lowest score counted as a near miss.
    pub fn near_miss_floor(&self) -> u8 {
        self.min_score.saturating_sub(self.near_miss_band)
    }
}

fn check_percent(field: &'static str, value: f64, max: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 || value >= max {
        return Err(ConfigError::InvalidPercent { field, value, max });
    }
    Ok(())
}
