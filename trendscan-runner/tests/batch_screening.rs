//! Batch screening: failure isolation, error tallies, cancellation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use trendscan_core::{FetchError, InMemorySource, PriceSeries, SeriesSource, TemplateConfig};
use trendscan_runner::{screen_batch, BatchOptions, ScreenEntry, ScreenError};

fn rising(symbol: &str) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let closes: Vec<f64> = (0..280).map(|i| 25.0 * 1.004_f64.powi(i)).collect();
    PriceSeries::from_closes(symbol, start, &closes).unwrap()
}

fn ten_symbols() -> Vec<String> {
    (0..10).map(|i| format!("SYM{i}")).collect()
}

fn full_source(symbols: &[String]) -> InMemorySource {
    let mut source = InMemorySource::new();
    for s in symbols {
        source.insert(rising(s));
    }
    source
}

#[test]
fn one_failing_fetch_of_ten_is_isolated() {
    // GIVEN ten symbols where one fetch fails
    let symbols = ten_symbols();
    let mut source = full_source(&symbols);
    source.fail("SYM4", FetchError::Unavailable("rate limited".into()));

    for parallel in [false, true] {
        // WHEN the batch is screened
        let opts = BatchOptions {
            parallel,
            cancel: None,
        };
        let batch = screen_batch(&symbols, &source, &TemplateConfig::default(), &opts);

        // THEN nine results and exactly one error come back
        assert_eq!(batch.entries.len(), 10);
        assert_eq!(batch.results().count(), 9);
        assert_eq!(batch.summary.errored, 1);
        assert_eq!(batch.summary.screened, 9);
        let errors = batch.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "SYM4");
        assert!(matches!(
            errors[0].1,
            ScreenError::Fetch(FetchError::Unavailable(_))
        ));
    }
}

#[test]
fn all_errors_is_still_a_batch() {
    let symbols = ten_symbols();
    let batch = screen_batch(
        &symbols,
        &InMemorySource::new(),
        &TemplateConfig::default(),
        &BatchOptions::default(),
    );
    assert_eq!(batch.summary.total, 10);
    assert_eq!(batch.summary.errored, 10);
    assert_eq!(batch.summary.screened, 0);
    assert!(batch
        .entries
        .iter()
        .all(|e| matches!(e, ScreenEntry::Failed { .. })));
}

#[test]
fn parallel_and_sequential_agree() {
    let symbols = ten_symbols();
    let source = full_source(&symbols);
    let config = TemplateConfig::default();
    let seq = screen_batch(&symbols, &source, &config, &BatchOptions::default());
    let par = screen_batch(
        &symbols,
        &source,
        &config,
        &BatchOptions {
            parallel: true,
            cancel: None,
        },
    );
    let seq_results: Vec<_> = seq.results().cloned().collect();
    let par_results: Vec<_> = par.results().cloned().collect();
    assert_eq!(seq_results, par_results);
    assert_eq!(seq.summary, par.summary);
}

/// Raises the cancel flag once `after` fetches have happened.
struct CancellingSource {
    inner: InMemorySource,
    fetched: AtomicUsize,
    after: usize,
    flag: Arc<AtomicBool>,
}

impl SeriesSource for CancellingSource {
    fn name(&self) -> &str {
        "cancelling"
    }

    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, FetchError> {
        let n = self.fetched.fetch_add(1, Ordering::SeqCst) + 1;
        if n >= self.after {
            self.flag.store(true, Ordering::SeqCst);
        }
        self.inner.fetch_series(symbol)
    }
}

#[test]
fn cancellation_keeps_partial_results() {
    // GIVEN a source that requests cancellation after three fetches
    let symbols = ten_symbols();
    let flag = Arc::new(AtomicBool::new(false));
    let source = CancellingSource {
        inner: full_source(&symbols),
        fetched: AtomicUsize::new(0),
        after: 3,
        flag: Arc::clone(&flag),
    };

    // WHEN screening sequentially
    let opts = BatchOptions {
        parallel: false,
        cancel: Some(flag),
    };
    let batch = screen_batch(&symbols, &source, &TemplateConfig::default(), &opts);

    // THEN the first three results survive and the rest are skipped
    let done: Vec<&str> = batch.entries.iter().map(|e| e.symbol()).collect();
    assert_eq!(done, vec!["SYM0", "SYM1", "SYM2"]);
    assert_eq!(batch.summary.screened, 3);
    assert_eq!(batch.summary.skipped, 7);
    assert_eq!(batch.summary.total, 10);
}

#[test]
fn parallel_cancellation_never_loses_finished_entries() {
    let symbols = ten_symbols();
    let flag = Arc::new(AtomicBool::new(false));
    let source = CancellingSource {
        inner: full_source(&symbols),
        fetched: AtomicUsize::new(0),
        after: 5,
        flag: Arc::clone(&flag),
    };
    let opts = BatchOptions {
        parallel: true,
        cancel: Some(flag),
    };
    let batch = screen_batch(&symbols, &source, &TemplateConfig::default(), &opts);

    let fetched = source.fetched.load(Ordering::SeqCst);
    assert_eq!(batch.entries.len(), fetched);
    assert_eq!(batch.summary.skipped, 10 - fetched);
    assert!(fetched >= 5);
}
