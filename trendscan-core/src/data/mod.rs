//! Price-history collaborators.

pub mod provider;

pub use provider::{FetchError, InMemorySource, SeriesSource};
