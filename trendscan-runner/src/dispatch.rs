//! The scan pipeline: screen → claim → render → send.
//!
//! Per-symbol problems never abort the scan. Store errors skip that
//! symbol's alert (nothing is sent without a persisted record), delivery
//! errors are counted and not retried; the history already records the
//! alert, so it will not be re-sent inside the cooldown window.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use trendscan_core::SeriesSource;

use crate::alerts::{AlertDecision, AlertDeduplicator, AlertStore, Clock};
use crate::config::{AppConfig, ConfigFingerprint};
use crate::format::{render_alert, render_scan_summary};
use crate::notify::{Notifier, SUMMARY_TOPIC};
use crate::screener::{screen_batch, BatchOptions, BatchResult};

/// Knobs for one scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub batch: BatchOptions,
    pub send_summary: bool,
    pub summary_top_n: usize,
}

impl ScanOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            batch: BatchOptions::default(),
            send_summary: config.alerts.send_summary,
            summary_top_n: config.alerts.summary_top_n,
        }
    }
}

/// A symbol paired with the error that stopped its alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolFailure {
    pub symbol: String,
    pub error: String,
}

/// What a scan did.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scanned_at: DateTime<Utc>,
    pub fingerprint: ConfigFingerprint,
    pub batch: BatchResult,
    /// Alerts delivered, in send order.
    pub sent: Vec<String>,
    /// Qualifying symbols still inside their cooldown.
    pub suppressed: Vec<String>,
    /// Claimed (history updated) but not delivered.
    pub delivery_failures: Vec<SymbolFailure>,
    /// Not claimed because the alert store failed.
    pub store_errors: Vec<SymbolFailure>,
    pub summary_sent: bool,
}

/// Run one full scan.
pub fn run_scan<S: AlertStore, C: Clock>(
    symbols: &[String],
    source: &dyn SeriesSource,
    config: &AppConfig,
    dedup: &AlertDeduplicator<S, C>,
    notifier: &dyn Notifier,
    opts: &ScanOptions,
) -> ScanReport {
    let fingerprint = config.fingerprint();
    let scanned_at = dedup.clock().now();
    info!(
        %fingerprint,
        symbols = symbols.len(),
        notifier = notifier.name(),
        "scan started"
    );

    let batch = screen_batch(symbols, source, &config.template, &opts.batch);

    let mut sent = Vec::new();
    let mut suppressed = Vec::new();
    let mut delivery_failures = Vec::new();
    let mut store_errors = Vec::new();

    for result in batch.ranked().into_iter().filter(|r| r.qualifies) {
        let symbol = result.symbol.clone();
        match dedup.claim(result) {
            Ok(AlertDecision::Emit(_)) => {
                let message = render_alert(result, &config.template);
                match notifier.send(&symbol, &message) {
                    Ok(()) => sent.push(symbol),
                    Err(e) => {
                        warn!(symbol = %symbol, error = %e, "alert delivery failed");
                        delivery_failures.push(SymbolFailure {
                            symbol,
                            error: e.to_string(),
                        });
                    }
                }
            }
            Ok(AlertDecision::Suppress { next_eligible, .. }) => {
                info!(symbol = %symbol, %next_eligible, "in cooldown, not alerting");
                suppressed.push(symbol);
            }
            Ok(AlertDecision::NotQualified) => {}
            Err(e) => {
                error!(symbol = %symbol, error = %e, "alert store failed, alert skipped");
                store_errors.push(SymbolFailure {
                    symbol,
                    error: e.to_string(),
                });
            }
        }
    }

    let summary_sent = opts.send_summary && {
        let text = render_scan_summary(&batch, scanned_at, opts.summary_top_n);
        match notifier.send(SUMMARY_TOPIC, &text) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "scan summary delivery failed");
                false
            }
        }
    };

    info!(
        sent = sent.len(),
        suppressed = suppressed.len(),
        delivery_failures = delivery_failures.len(),
        store_errors = store_errors.len(),
        "scan finished"
    );

    ScanReport {
        scanned_at,
        fingerprint,
        batch,
        sent,
        suppressed,
        delivery_failures,
        store_errors,
        summary_sent,
    }
}
