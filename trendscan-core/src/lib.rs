//! TrendScan Core: price series, indicators, trend-template criteria, scoring.
//!
//! This crate is the pure half of the screener:
//! - Domain types (validated ascending price series)
//! - Close-series indicators (SMA, rolling high/low)
//! - The nine trend-template criteria and their scorer
//! - `evaluate()`: one symbol in, one immutable `ScreenResult` out
//! - The `SeriesSource` collaborator trait
//!
//! Nothing here performs I/O, reads the clock, or logs.

pub mod data;
pub mod domain;
pub mod indicators;
pub mod screen;
pub mod template;

pub use data::{FetchError, InMemorySource, SeriesSource};
pub use domain::{PricePoint, PriceSeries, SeriesError};
pub use screen::{evaluate, Completeness, ScreenResult};
pub use template::{ConfigError, Criterion, CriterionResult, IndicatorSet, TemplateConfig, Verdict};
