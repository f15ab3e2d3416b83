use std::path::Path;

use iparo_linking::LinkingStrategy;
use serde::{Deserialize, Serialize};

use crate::error::{ArchiveError, ArchiveResult};

/// Configuration for an [`Archive`](crate::Archive).
///
/// ```toml
/// clamp_clock = true
/// seed = 42
///
/// [strategy]
/// kind = "k_previous"
/// k = 3
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Strategy used to link every new snapshot.
    pub strategy: LinkingStrategy,
    /// When `true`, a wall-clock timestamp that falls behind the current
    /// head is moved up to the head's timestamp instead of being rejected.
    pub clamp_clock: bool,
    /// Seed for strategies that sample randomly. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            strategy: LinkingStrategy::Single,
            clamp_clock: true,
            seed: None,
        }
    }
}

impl ArchiveConfig {
    pub fn with_strategy(strategy: LinkingStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> ArchiveResult<()> {
        self.strategy
            .validate()
            .map_err(|e| ArchiveError::Config(e.to_string()))
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> ArchiveResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ArchiveError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ArchiveResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ArchiveError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> ArchiveResult<String> {
        toml::to_string(self).map_err(|e| ArchiveError::Config(e.to_string()))
    }
}
