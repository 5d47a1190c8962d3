//! Autotile configuration
//!
//! The resolver reads a single policy: whether cells outside the map count
//! as solid. Hosts can keep it in a TOML file next to their other settings.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading or saving autotile configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Configuration for auto-tile resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutotileConfig {
    /// Treat the area outside the map as solid when sampling neighbors
    #[serde(default = "default_outside_is_solid")]
    pub outside_is_solid: bool,
}

fn default_outside_is_solid() -> bool {
    true
}

impl Default for AutotileConfig {
    fn default() -> Self {
        Self {
            outside_is_solid: default_outside_is_solid(),
        }
    }
}

impl AutotileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outside_is_solid(mut self, outside_is_solid: bool) -> Self {
        self.outside_is_solid = outside_is_solid;
        self
    }

    /// Parse configuration from TOML
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
