//! Trend template: indicator snapshot, nine criteria, scoring.
//!
//! Pipeline per symbol:
//! closes → [`IndicatorSet::compute`] → [`evaluate_criteria`] → [`verdict`].

pub mod config;
pub mod criteria;
pub mod indicator_set;
pub mod score;

pub use config::{ConfigError, TemplateConfig};
pub use criteria::{evaluate_criteria, Criterion, CriterionResult, CRITERION_COUNT};
pub use indicator_set::IndicatorSet;
pub use score::{classify, score, verdict, Verdict};
