//! Alert state: records, persistence, clock and the deduplicator.

pub mod clock;
pub mod dedup;
pub mod record;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dedup::{default_cooldown, should_alert, AlertDecision, AlertDeduplicator};
pub use record::{AlertHistory, AlertRecord, AlertStatistics};
pub use store::{AlertStore, JsonFileStore, MemoryStore, StoreError};
