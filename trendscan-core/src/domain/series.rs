//! PriceSeries: the daily close history for one symbol.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Structural problems found while building a series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("duplicate date {date} at index {index}")]
    DuplicateDate { date: NaiveDate, index: usize },

    #[error("dates not ascending at index {index} ({previous} then {current})")]
    NonAscending {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("invalid close {value} at index {index} (must be finite and > 0)")]
    InvalidClose { index: usize, value: f64 },
}

/// Ordered daily closes for one symbol.
///
/// Dates are strictly ascending; gaps (weekends, holidays) are fine.
/// An empty series is valid and simply evaluates as incomplete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a validated series.
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for (index, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(SeriesError::InvalidClose {
                    index,
                    value: point.close,
                });
            }
        }

        for (index, pair) in points.windows(2).enumerate() {
            let (previous, current) = (pair[0].date, pair[1].date);
            if current == previous {
                return Err(SeriesError::DuplicateDate {
                    date: current,
                    index: index + 1,
                });
            }
            if current < previous {
                return Err(SeriesError::NonAscending {
                    index: index + 1,
                    previous,
                    current,
                });
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            points,
        })
    }

    /// Build a series from closes on consecutive calendar days starting at `start`.
    pub fn from_closes(
        symbol: impl Into<String>,
        start: NaiveDate,
        closes: &[f64],
    ) -> Result<Self, SeriesError> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint::new(start + chrono::Duration::days(i as i64), close))
            .collect();
        Self::new(symbol, points)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Close prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// The most recent point, if any.
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}
