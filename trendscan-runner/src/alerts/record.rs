//! Alert records and the per-symbol history they live in.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Last alert sent for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub symbol: String,
    pub last_alerted: DateTime<Utc>,
    pub last_score: u8,
    /// Alerts ever sent for this symbol.
    pub alert_count: u32,
}

impl AlertRecord {
    /// Earliest instant another alert may go out, saturating at the
    /// latest representable time.
    pub fn next_eligible(&self, cooldown: Duration) -> DateTime<Utc> {
        self.last_alerted
            .checked_add_signed(cooldown)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// `now - window`, clamped to the earliest representable time.
fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Symbol → record map. One record per symbol, overwritten on every alert.
///
/// Serialized as a plain JSON object keyed by symbol, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertHistory {
    records: BTreeMap<String, AlertRecord>,
}

/// Aggregate view of an alert history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertStatistics {
    pub symbols_alerted: usize,
    pub total_alerts: u64,
    pub alerts_last_24h: usize,
    /// Up to five symbols with the highest alert counts.
    pub most_alerted: Vec<(String, u32)>,
}

impl AlertHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<&AlertRecord> {
        self.records.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlertRecord> {
        self.records.values()
    }

    /// Record an alert sent at `at`, bumping the count of any previous record.
    pub fn upsert(&mut self, symbol: &str, at: DateTime<Utc>, score: u8) -> AlertRecord {
        let alert_count = self.records.get(symbol).map_or(0, |r| r.alert_count) + 1;
        let record = AlertRecord {
            symbol: symbol.to_string(),
            last_alerted: at,
            last_score: score,
            alert_count,
        };
        self.records.insert(symbol.to_string(), record.clone());
        record
    }

    /// Records alerted within `window` of `now`, most recent first.
    pub fn recent(&self, now: DateTime<Utc>, window: Duration) -> Vec<&AlertRecord> {
        let cutoff = window_start(now, window);
        let mut recent: Vec<&AlertRecord> = self
            .records
            .values()
            .filter(|r| r.last_alerted > cutoff)
            .collect();
        recent.sort_by(|a, b| {
            b.last_alerted
                .cmp(&a.last_alerted)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        recent
    }

    pub fn statistics(&self, now: DateTime<Utc>) -> AlertStatistics {
        let mut by_count: Vec<(String, u32)> = self
            .records
            .values()
            .map(|r| (r.symbol.clone(), r.alert_count))
            .collect();
        by_count.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        by_count.truncate(5);

        AlertStatistics {
            symbols_alerted: self.records.len(),
            total_alerts: self.records.values().map(|r| u64::from(r.alert_count)).sum(),
            alerts_last_24h: self.recent(now, Duration::hours(24)).len(),
            most_alerted: by_count,
        }
    }

    /// Drop records last alerted at or before `now - age`. Returns how many.
    /// Records last alerted at least `age` before `now`.
    pub fn older_than(&self, now: DateTime<Utc>, age: Duration) -> Vec<&AlertRecord> {
        let cutoff = window_start(now, age);
        self.records
            .values()
            .filter(|r| r.last_alerted <= cutoff)
            .collect()
    }

    pub fn prune_older_than(&mut self, now: DateTime<Utc>, age: Duration) -> usize {
        let cutoff = window_start(now, age);
        let before = self.records.len();
        self.records.retain(|_, r| r.last_alerted > cutoff);
        before - self.records.len()
    }
}
