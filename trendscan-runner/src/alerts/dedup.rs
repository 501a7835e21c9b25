//! Emit-or-suppress decisions against the persisted alert history.
//!
//! The history is updated *before* the caller sends anything. A crash or a
//! failed delivery after [`AlertDeduplicator::claim`] returns `Emit` loses
//! that alert rather than sending it twice: delivery is at-most-once per
//! cooldown window.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};
use trendscan_core::ScreenResult;

use super::clock::Clock;
use super::record::{AlertHistory, AlertRecord};
use super::store::{AlertStore, StoreError};

/// Default minimum gap between two alerts for one symbol.
pub fn default_cooldown() -> Duration {
    Duration::hours(24)
}

/// Whether `result` may alert at `now`.
///
/// Non-qualifying results never alert. A symbol without a record always may;
/// otherwise at least `cooldown` must have elapsed since the last alert.
pub fn should_alert(
    result: &ScreenResult,
    history: &AlertHistory,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> bool {
    if !result.qualifies {
        return false;
    }
    match history.get(&result.symbol) {
        None => true,
        Some(record) => now - record.last_alerted >= cooldown,
    }
}

/// Outcome of [`AlertDeduplicator::claim`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AlertDecision {
    /// History updated; the caller should send now.
    Emit(AlertRecord),
    /// Still inside the cooldown window.
    Suppress {
        last_alerted: DateTime<Utc>,
        next_eligible: DateTime<Utc>,
    },
    NotQualified,
}

impl AlertDecision {
    pub fn is_emit(&self) -> bool {
        matches!(self, AlertDecision::Emit(_))
    }
}

/// Serializes load → check → save over one store.
///
/// The lock covers every claim made through this value, so concurrent
/// claims for the same symbol cannot both emit. Separate processes sharing a
/// history file are not coordinated.
pub struct AlertDeduplicator<S, C> {
    store: S,
    clock: C,
    cooldown: Duration,
    lock: Mutex<()>,
}

impl<S: AlertStore, C: Clock> AlertDeduplicator<S, C> {
    pub fn new(store: S, clock: C, cooldown: Duration) -> Self {
        Self {
            store,
            clock,
            cooldown,
            lock: Mutex::new(()),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current persisted history.
    pub fn history(&self) -> Result<AlertHistory, StoreError> {
        self.store.load()
    }

    /// Decide for one result and, on `Emit`, persist the new record first.
    pub fn claim(&self, result: &ScreenResult) -> Result<AlertDecision, StoreError> {
        if !result.qualifies {
            return Ok(AlertDecision::NotQualified);
        }

        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut history = self.store.load()?;
        let now = self.clock.now();

        if !should_alert(result, &history, now, self.cooldown) {
            let (last_alerted, next_eligible) = match history.get(&result.symbol) {
                Some(r) => (r.last_alerted, r.next_eligible(self.cooldown)),
                None => (now, now),
            };
            debug!(symbol = %result.symbol, %next_eligible, "alert suppressed");
            return Ok(AlertDecision::Suppress {
                last_alerted,
                next_eligible,
            });
        }

        let record = history.upsert(&result.symbol, now, result.score);
        self.store.save(&history)?;
        info!(
            symbol = %result.symbol,
            score = result.score,
            alert_count = record.alert_count,
            "alert claimed"
        );
        Ok(AlertDecision::Emit(record))
    }
}
