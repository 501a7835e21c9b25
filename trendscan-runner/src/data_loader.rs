//! Local series sources for the screener.
//!
//! - [`CsvSeriesSource`] reads `<dir>/<SYMBOL>.csv` files with a `date` and a
//!   `close` column (header names are matched case-insensitively, so exports
//!   with `Date,Open,High,Low,Close,...` work unchanged).
//! - [`SyntheticSource`] generates a deterministic random walk per symbol.
//!   Synthetic data is a developer-only demo mode; results carry the
//!   `synthetic` source name in logs and reports.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use trendscan_core::{FetchError, PricePoint, PriceSeries, SeriesSource};

/// Accepted date formats, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y"];

/// Reads one CSV file per symbol from a directory.
#[derive(Debug, Clone)]
pub struct CsvSeriesSource {
    dir: PathBuf,
}

impl CsvSeriesSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl SeriesSource for CsvSeriesSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, FetchError> {
        validate_symbol(symbol)?;
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(FetchError::NotFound {
                symbol: symbol.to_string(),
            });
        }
        let points = read_points(symbol, &path)?;
        PriceSeries::new(symbol, points).map_err(|source| FetchError::Series {
            symbol: symbol.to_string(),
            source,
        })
    }
}

/// Reject symbols that would escape the data directory.
fn validate_symbol(symbol: &str) -> Result<(), FetchError> {
    let bad = symbol.is_empty()
        || symbol.contains(['/', '\\'])
        || symbol.starts_with('.');
    if bad {
        return Err(FetchError::InvalidData {
            symbol: symbol.to_string(),
            reason: "symbol is not a valid file name".into(),
        });
    }
    Ok(())
}

fn read_points(symbol: &str, path: &Path) -> Result<Vec<PricePoint>, FetchError> {
    let invalid = |reason: String| FetchError::InvalidData {
        symbol: symbol.to_string(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| invalid(format!("open {}: {e}", path.display())))?;

    let headers = reader
        .headers()
        .map_err(|e| invalid(format!("read header: {e}")))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| invalid(format!("missing '{name}' column")))
    };
    let date_col = column("date")?;
    let close_col = column("close")?;

    let mut points = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| invalid(format!("row {}: {e}", row + 1)))?;
        let raw_close = record.get(close_col).unwrap_or("");
        // Provider exports leave holidays and halts blank.
        if raw_close.is_empty() || raw_close.eq_ignore_ascii_case("null") {
            continue;
        }
        let raw_date = record.get(date_col).unwrap_or("");
        let date = parse_date(raw_date)
            .ok_or_else(|| invalid(format!("row {}: bad date '{raw_date}'", row + 1)))?;
        let close: f64 = raw_close
            .parse()
            .map_err(|_| invalid(format!("row {}: bad close '{raw_close}'", row + 1)))?;
        points.push(PricePoint::new(date, close));
    }

    // Some exports are newest-first.
    points.sort_by_key(|p| p.date);
    Ok(points)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    // Timestamps like "2024-01-02 00:00:00-05:00" keep only the date part.
    let day = raw.split([' ', 'T']).next().unwrap_or(raw);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
}

/// Deterministic random-walk prices, one business day per bar.
///
/// The walk for a symbol depends only on the symbol name and the source's
/// parameters, so repeated scans see the same data.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    bars: usize,
    start: NaiveDate,
    drift: f64,
    volatility: f64,
}

impl SyntheticSource {
    /// `bars` business days starting 2023-01-02.
    pub fn new(bars: usize) -> Self {
        Self {
            bars,
            start: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap_or(NaiveDate::MIN),
            drift: 0.0,
            volatility: 0.02,
        }
    }

    /// Mean daily return added to every step.
    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    /// Half-width of the uniform daily return noise.
    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility.abs();
        self
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(400)
    }
}

impl SeriesSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, FetchError> {
        let points = generate_synthetic_points(symbol, self);
        PriceSeries::new(symbol, points).map_err(|source| FetchError::Series {
            symbol: symbol.to_string(),
            source,
        })
    }
}

fn generate_synthetic_points(symbol: &str, params: &SyntheticSource) -> Vec<PricePoint> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // Deterministic seed from symbol name
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut points = Vec::with_capacity(params.bars);
    let mut price = rng.gen_range(20.0..500.0_f64);
    let mut current = params.start;

    while points.len() < params.bars {
        let weekday = current.weekday();
        if weekday != chrono::Weekday::Sat && weekday != chrono::Weekday::Sun {
            let noise = if params.volatility > 0.0 {
                rng.gen_range(-params.volatility..params.volatility)
            } else {
                0.0
            };
            // Floor keeps closes strictly positive under heavy negative drift.
            price = (price * (1.0 + params.drift + noise)).max(0.01);
            points.push(PricePoint::new(current, price));
        }
        current += chrono::Duration::days(1);
    }

    points
}
