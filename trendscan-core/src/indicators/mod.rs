//! Indicators over daily close series.
//!
//! Indicators are pure functions: closes in, numeric series out. Every output
//! series has the same length as its input; positions without enough history
//! hold `f64::NAN` (warmup). `latest()` is the single-value form used by the
//! screener and fails with `InsufficientData` instead of returning NaN.
//!
//! # Look-ahead contamination guard
//! No value at index t may depend on closes after t. Every indicator must pass
//! the truncated-vs-full series test.

pub mod rolling_extreme;
pub mod sma;

pub use rolling_extreme::{Extreme, RollingExtreme};
pub use sma::Sma;

use thiserror::Error;

/// Errors from single-value indicator evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: need {required} closes, have {available}")]
    InsufficientData { required: usize, available: usize },
}

/// Trait for close-series indicators.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_50", "rolling_max_252").
    fn name(&self) -> &str;

    /// Number of closes consumed before the first valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire series.
    ///
    /// The first `lookback()` values are `f64::NAN`.
    fn compute(&self, closes: &[f64]) -> Vec<f64>;

    /// Value at the last index, or `InsufficientData` if the series is too short.
    fn latest(&self, closes: &[f64]) -> Result<f64, IndicatorError> {
        let required = self.lookback() + 1;
        if closes.len() < required {
            return Err(IndicatorError::InsufficientData {
                required,
                available: closes.len(),
            });
        }
        let start = closes.len() - required;
        let values = self.compute(&closes[start..]);
        Ok(values[values.len() - 1])
    }
}

/// Read an indicator value at `index`, treating NaN and out-of-range as undefined.
pub fn defined_at(series: &[f64], index: usize) -> Option<f64> {
    series.get(index).copied().filter(|v| !v.is_nan())
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
