//! Application configuration: one TOML file, validated once at startup.
//!
//! ```toml
//! [template]
//! min_score = 7
//!
//! [alerts]
//! cooldown_hours = 24
//! history_path = "data/alert_history.json"
//!
//! [data]
//! series_dir = "data/series"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every section and field is optional; missing values take their defaults.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use trendscan_core::{ConfigError, TemplateConfig};

/// Short content hash of the screening parameters.
pub type ConfigFingerprint = String;

/// Longest accepted cooldown: ten years.
pub const MAX_COOLDOWN_HOURS: f64 = 24.0 * 365.0 * 10.0;

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid [template]: {0}")]
    Invalid(#[from] ConfigError),

    #[error("alerts.cooldown_hours must be in [0, 87600], got {0}")]
    Cooldown(f64),

    #[error("alerts.summary_top_n must be >= 1")]
    ZeroSummarySize,
}

/// Alert deduplication and delivery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Minimum hours between two alerts for the same symbol.
    pub cooldown_hours: f64,
    /// JSON file holding one record per alerted symbol.
    pub history_path: PathBuf,
    /// Send a scan summary after the per-symbol alerts.
    pub send_summary: bool,
    /// Results listed in the scan summary.
    pub summary_top_n: usize,
    /// When set, messages are appended to this JSONL file instead of stdout.
    pub outbox_path: Option<PathBuf>,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            cooldown_hours: 24.0,
            history_path: PathBuf::from("data/alert_history.json"),
            send_summary: true,
            summary_top_n: 10,
            outbox_path: None,
        }
    }
}

impl AlertsConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::milliseconds((self.cooldown_hours * 3_600_000.0).round() as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory of `<SYMBOL>.csv` files.
    pub series_dir: PathBuf,
    /// Universe TOML used when no symbols are given on the command line.
    pub universe_path: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            series_dir: PathBuf::from("data/series"),
            universe_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub template: TemplateConfig,
    pub alerts: AlertsConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Read, parse and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, AppConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| AppConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, AppConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, AppConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), AppConfigError> {
        self.template.validate()?;
        let hours = self.alerts.cooldown_hours;
        if !(0.0..=MAX_COOLDOWN_HOURS).contains(&hours) {
            return Err(AppConfigError::Cooldown(hours));
        }
        if self.alerts.summary_top_n == 0 {
            return Err(AppConfigError::ZeroSummarySize);
        }
        Ok(())
    }

    /// Deterministic BLAKE3 hash of the screening parameters.
    ///
    /// Two scans with the same fingerprint applied identical criteria, so
    /// their scores are comparable.
    pub fn fingerprint(&self) -> ConfigFingerprint {
        let json = serde_json::to_string(&self.template).unwrap_or_default();
        let hash = blake3::hash(json.as_bytes());
        hash.to_hex()[..16].to_string()
    }
}
