//! Kernel configuration.
//!
//! ```toml
//! history_limit = 50
//! autosave_interval_ms = 30000
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default number of retained history snapshots.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
/// Default autosave period in milliseconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 30_000;

/// Tunables of a [`crate::PageStore`] and its autosave loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    /// Maximum number of history snapshots (including the page-load snapshot).
    pub history_limit: usize,
    /// Minimum time between two autosave attempts.
    pub autosave_interval_ms: u64,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            autosave_interval_ms: DEFAULT_AUTOSAVE_INTERVAL_MS,
        }
    }
}

impl BuilderConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid(
                "history_limit must be at least 1".to_string(),
            ));
        }
        if self.autosave_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "autosave_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Autosave period as a [`Duration`].
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms)
    }
}
