//! Domain types shared across the workspace.

pub mod series;

pub use series::{PricePoint, PriceSeries, SeriesError};
