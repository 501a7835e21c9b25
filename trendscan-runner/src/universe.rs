//! Universe file: index-organized symbol lists.
//!
//! The universe is a TOML file mapping a group name (an index or a sector)
//! to its member symbols:
//!
//! ```toml
//! [groups]
//! "Nifty 50" = ["RELIANCE", "TCS", "INFY"]
//! Banks = ["HDFCBANK", "ICICIBANK"]
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize universe: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("universe has no symbols")]
    Empty,
}

/// The complete universe configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub groups: BTreeMap<String, Vec<String>>,
}

impl Universe {
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|source| UniverseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a universe; a file without any symbol is rejected.
    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        let universe: Universe = toml::from_str(content)?;
        if universe.symbol_count() == 0 {
            return Err(UniverseError::Empty);
        }
        Ok(universe)
    }

    pub fn to_toml(&self) -> Result<String, UniverseError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Every symbol once, in group order then file order.
    ///
    /// Symbols are upper-cased; a symbol listed in several groups appears
    /// only at its first position.
    pub fn all_symbols(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.groups
            .values()
            .flatten()
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect()
    }

    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(|v| v.as_slice())
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(|s| s.as_str()).collect()
    }

    /// Total entries across groups, duplicates included.
    pub fn symbol_count(&self) -> usize {
        self.groups.values().map(|v| v.len()).sum()
    }

    /// A small large-cap NSE universe for first runs.
    pub fn default_nse() -> Self {
        let mut groups = BTreeMap::new();

        groups.insert(
            "Nifty 50".into(),
            [
                "RELIANCE", "TCS", "HDFCBANK", "INFY", "ICICIBANK", "HINDUNILVR", "ITC", "SBIN",
                "BHARTIARTL", "KOTAKBANK", "LT", "AXISBANK", "MARUTI", "TITAN", "SUNPHARMA",
                "BAJFINANCE", "WIPRO", "HCLTECH", "NTPC", "TATASTEEL",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );

        groups.insert(
            "Nifty Next 50".into(),
            [
                "ABB", "BANKBARODA", "DLF", "GAIL", "HAVELLS", "LUPIN", "PIDILITIND", "SIEMENS",
                "TRENT", "VEDL",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );

        Self { groups }
    }
}
