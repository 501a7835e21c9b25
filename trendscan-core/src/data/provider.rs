//! Series source trait and structured fetch errors.
//!
//! `SeriesSource` abstracts over where price history comes from (CSV files,
//! a market-data API, synthetic data) so the screener can be driven by any of
//! them and by in-memory fixtures in tests.

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::{PriceSeries, SeriesError};

/// Structured fetch errors. All of them are per-symbol and non-fatal for a batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("symbol not found: {symbol}")]
    NotFound { symbol: String },

    #[error("data source unavailable: {0}")]
    Unavailable(String),

    #[error("invalid data for {symbol}: {reason}")]
    InvalidData { symbol: String, reason: String },

    #[error("invalid series for {symbol}: {source}")]
    Series {
        symbol: String,
        #[source]
        source: SeriesError,
    },
}

/// Trait for price-history providers.
///
/// Implementations return the full ascending close history they have for a
/// symbol; the screener decides how much of it to use.
pub trait SeriesSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, FetchError>;
}

/// Fixed in-memory source keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    series: HashMap<String, PriceSeries>,
    failures: HashMap<String, FetchError>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.symbol().to_string(), series);
    }

    /// Make `symbol` fail with `error` on every fetch.
    pub fn fail(&mut self, symbol: impl Into<String>, error: FetchError) {
        self.failures.insert(symbol.into(), error);
    }

    pub fn with(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }
}

impl SeriesSource for InMemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, FetchError> {
        if let Some(err) = self.failures.get(symbol) {
            return Err(err.clone());
        }
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                symbol: symbol.to_string(),
            })
    }
}
