//! Batch screening with per-symbol failure isolation.
//!
//! One symbol's fetch error never aborts the batch: it becomes a
//! [`ScreenEntry::Failed`] and is counted in the summary. Screening can run on
//! the rayon pool and can be cancelled between symbols.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use trendscan_core::{
    evaluate, ConfigError, FetchError, ScreenResult, SeriesSource, TemplateConfig, Verdict,
};

/// Options for a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Screen symbols on the rayon pool.
    pub parallel: bool,
    /// Checked before each symbol; once set, remaining symbols are skipped.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl BatchOptions {
    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|f| f.load(Ordering::Relaxed))
    }
}

/// Why a symbol produced no result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScreenError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The template config was rejected before any symbol was fetched.
    #[error("invalid template config: {0}")]
    Config(ConfigError),
}

/// Outcome for one symbol.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScreenEntry {
    Screened(ScreenResult),
    Failed {
        symbol: String,
        #[serde(serialize_with = "serialize_display")]
        error: ScreenError,
    },
}

impl ScreenEntry {
    pub fn symbol(&self) -> &str {
        match self {
            ScreenEntry::Screened(r) => &r.symbol,
            ScreenEntry::Failed { symbol, .. } => symbol,
        }
    }

    pub fn result(&self) -> Option<&ScreenResult> {
        match self {
            ScreenEntry::Screened(r) => Some(r),
            ScreenEntry::Failed { .. } => None,
        }
    }
}

fn serialize_display<S: Serializer>(error: &ScreenError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

/// Counts over a batch. Derived from the entries, never tracked separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Symbols requested.
    pub total: usize,
    /// Symbols with a `ScreenResult` (any verdict).
    pub screened: usize,
    /// Qualifying results, perfect ones included.
    pub qualified: usize,
    pub perfect: usize,
    pub near_miss: usize,
    pub incomplete: usize,
    pub errored: usize,
    /// Not attempted because the batch was cancelled.
    pub skipped: usize,
}

impl BatchSummary {
    pub fn from_entries(total: usize, entries: &[ScreenEntry]) -> Self {
        let mut summary = BatchSummary {
            total,
            skipped: total.saturating_sub(entries.len()),
            ..Default::default()
        };
        for entry in entries {
            match entry {
                ScreenEntry::Failed { .. } => summary.errored += 1,
                ScreenEntry::Screened(r) => {
                    summary.screened += 1;
                    if r.qualifies {
                        summary.qualified += 1;
                    }
                    match r.verdict {
                        Verdict::Perfect => summary.perfect += 1,
                        Verdict::NearMiss => summary.near_miss += 1,
                        Verdict::Incomplete => summary.incomplete += 1,
                        Verdict::Qualifies | Verdict::Fails => {}
                    }
                }
            }
        }
        summary
    }
}

/// Everything a batch produced, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub started_at: DateTime<Utc>,
    pub source: String,
    pub entries: Vec<ScreenEntry>,
    pub summary: BatchSummary,
}

impl BatchResult {
    pub fn results(&self) -> impl Iterator<Item = &ScreenResult> {
        self.entries.iter().filter_map(ScreenEntry::result)
    }

    pub fn qualified(&self) -> Vec<&ScreenResult> {
        self.results().filter(|r| r.qualifies).collect()
    }

    pub fn near_misses(&self) -> Vec<&ScreenResult> {
        self.results().filter(|r| r.is_near_miss()).collect()
    }

    pub fn errors(&self) -> Vec<(&str, &ScreenError)> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                ScreenEntry::Failed { symbol, error } => Some((symbol.as_str(), error)),
                ScreenEntry::Screened(_) => None,
            })
            .collect()
    }

    /// Screened results, best first.
    pub fn ranked(&self) -> Vec<&ScreenResult> {
        let mut ranked: Vec<&ScreenResult> = self.results().collect();
        ranked.sort_by(|a, b| rank_order(a, b));
        ranked
    }
}

/// Higher score first, then closer to the range high, then symbol.
pub fn rank_order(a: &ScreenResult, b: &ScreenResult) -> CmpOrdering {
    let distance = |r: &ScreenResult| r.indicators.pct_below_high().unwrap_or(f64::INFINITY);
    b.score
        .cmp(&a.score)
        .then_with(|| distance(a).total_cmp(&distance(b)))
        .then_with(|| a.symbol.cmp(&b.symbol))
}

/// Fetch and evaluate one symbol.
pub fn screen_symbol(
    symbol: &str,
    source: &dyn SeriesSource,
    config: &TemplateConfig,
) -> ScreenEntry {
    match source.fetch_series(symbol) {
        Ok(series) => {
            let result = evaluate(symbol, &series, config);
            debug!(
                symbol,
                score = result.score,
                verdict = ?result.verdict,
                bars = series.len(),
                "screened"
            );
            ScreenEntry::Screened(result)
        }
        Err(error) => {
            warn!(symbol, source = source.name(), %error, "fetch failed");
            ScreenEntry::Failed {
                symbol: symbol.to_string(),
                error: error.into(),
            }
        }
    }
}

/// Screen every symbol.
///
/// Never fails as a whole: an all-error batch is still a well-formed
/// `BatchResult` with `summary.errored == summary.total`. An invalid
/// `config` fails every symbol without fetching any.
pub fn screen_batch(
    symbols: &[String],
    source: &dyn SeriesSource,
    config: &TemplateConfig,
    opts: &BatchOptions,
) -> BatchResult {
    let started_at = Utc::now();
    let timer = Instant::now();
    info!(
        symbols = symbols.len(),
        source = source.name(),
        parallel = opts.parallel,
        "batch started"
    );

    if let Err(e) = config.validate() {
        error!(error = %e, "template config rejected, nothing screened");
        let entries: Vec<ScreenEntry> = symbols
            .iter()
            .map(|symbol| ScreenEntry::Failed {
                symbol: symbol.clone(),
                error: ScreenError::Config(e.clone()),
            })
            .collect();
        return BatchResult {
            started_at,
            source: source.name().to_string(),
            summary: BatchSummary::from_entries(symbols.len(), &entries),
            entries,
        };
    }

    let attempt = |symbol: &String| -> Option<ScreenEntry> {
        if opts.is_cancelled() {
            return None;
        }
        Some(screen_symbol(symbol, source, config))
    };

    let entries: Vec<ScreenEntry> = if opts.parallel {
        symbols.par_iter().filter_map(attempt).collect()
    } else {
        // Sequential mode stops at the first cancelled check.
        symbols.iter().map_while(attempt).collect()
    };

    let summary = BatchSummary::from_entries(symbols.len(), &entries);
    info!(
        screened = summary.screened,
        qualified = summary.qualified,
        near_miss = summary.near_miss,
        errored = summary.errored,
        skipped = summary.skipped,
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "batch finished"
    );
    if summary.skipped > 0 {
        warn!(skipped = summary.skipped, "batch cancelled");
    }

    BatchResult {
        started_at,
        source: source.name().to_string(),
        entries,
        summary,
    }
}
