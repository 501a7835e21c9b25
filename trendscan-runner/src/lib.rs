//! TrendScan Runner: batch screening, alert state, notification dispatch.
//!
//! This crate builds on `trendscan-core` to provide:
//! - The application config file and its fingerprint
//! - CSV and synthetic series sources, and the universe file
//! - Batch screening with failure isolation and cancellation
//! - Alert history persistence and the cooldown deduplicator
//! - Message rendering, notifiers, and the full scan pipeline

pub mod alerts;
pub mod config;
pub mod data_loader;
pub mod dispatch;
pub mod format;
pub mod notify;
pub mod screener;
pub mod universe;

pub use alerts::{
    should_alert, AlertDecision, AlertDeduplicator, AlertHistory, AlertRecord, AlertStatistics,
    AlertStore, Clock, JsonFileStore, ManualClock, MemoryStore, StoreError, SystemClock,
};
pub use config::{AlertsConfig, AppConfig, AppConfigError, DataConfig, LoggingConfig};
pub use data_loader::{CsvSeriesSource, SyntheticSource};
pub use dispatch::{run_scan, ScanOptions, ScanReport, SymbolFailure};
pub use format::{render_alert, render_near_misses, render_scan_summary};
pub use notify::{DeliveryError, LogNotifier, Notifier, OutboxNotifier};
pub use screener::{
    screen_batch, BatchOptions, BatchResult, BatchSummary, ScreenEntry, ScreenError,
};
pub use universe::{Universe, UniverseError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn batch_types_are_send_sync() {
        assert_send::<BatchResult>();
        assert_sync::<BatchResult>();
        assert_send::<BatchOptions>();
        assert_sync::<BatchOptions>();
    }

    #[test]
    fn sources_are_send_sync() {
        assert_send::<CsvSeriesSource>();
        assert_sync::<CsvSeriesSource>();
        assert_send::<SyntheticSource>();
        assert_sync::<SyntheticSource>();
    }

    #[test]
    fn deduplicator_is_send_sync() {
        assert_send::<AlertDeduplicator<JsonFileStore, SystemClock>>();
        assert_sync::<AlertDeduplicator<JsonFileStore, SystemClock>>();
        assert_sync::<AlertDeduplicator<MemoryStore, ManualClock>>();
    }

    #[test]
    fn notifiers_are_send_sync() {
        assert_send::<OutboxNotifier>();
        assert_sync::<OutboxNotifier>();
        assert_sync::<LogNotifier>();
    }

    #[test]
    fn config_is_send_sync() {
        assert_send::<AppConfig>();
        assert_sync::<AppConfig>();
    }
}
