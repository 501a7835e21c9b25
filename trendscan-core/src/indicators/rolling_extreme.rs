//! Rolling extreme: highest / lowest close over a trailing window.
//!
//! Used for the 52-week range: `max(close[t-period+1..=t])` and
//! `min(close[t-period+1..=t])`. The window includes the current close.
//!
//! Lookback: period - 1.

use super::Indicator;

/// Which extreme to track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Max,
    Min,
}

#[derive(Debug, Clone)]
pub struct RollingExtreme {
    period: usize,
    extreme: Extreme,
    name: String,
}

impl RollingExtreme {
    pub fn max(period: usize) -> Self {
        assert!(period >= 1, "rolling extreme period must be >= 1");
        Self {
            period,
            extreme: Extreme::Max,
            name: format!("rolling_max_{period}"),
        }
    }

    pub fn min(period: usize) -> Self {
        assert!(period >= 1, "rolling extreme period must be >= 1");
        Self {
            period,
            extreme: Extreme::Min,
            name: format!("rolling_min_{period}"),
        }
    }
}

impl Indicator for RollingExtreme {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let n = closes.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &closes[i + 1 - self.period..=i];
            if window.iter().any(|v| v.is_nan()) {
                continue;
            }
            result[i] = match self.extreme {
                Extreme::Max => window.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                Extreme::Min => window.iter().copied().fold(f64::INFINITY, f64::min),
            };
        }

        result
    }
}
