//! Global configuration management
//!
//! Reads user-wide settings from `config.toml` in the config directory:
//! output preferences and fallback toolchain commands used when a project
//! defines none.

use crate::core::manifest::ToolchainCommands;
use crate::infra::dirs::TinbuildDirs;
use crate::infra::filesystem;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Global configuration error types
#[derive(Error, Debug)]
pub enum GlobalConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Global configuration for tinbuild
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GlobalConfig {
    /// Output preferences
    #[serde(default)]
    pub output: OutputPreferences,

    /// Fallback commands for every project
    #[serde(default)]
    pub toolchain: ToolchainCommands,
}

/// Output preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputPreferences {
    /// Enable quiet mode
    pub quiet: Option<bool>,

    /// Enable verbose mode
    pub verbose: Option<bool>,
}

impl GlobalConfig {
    /// Load global configuration from the config directory
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns `GlobalConfigError::ParseError` if the config file exists but
    /// contains invalid TOML.
    pub fn load(dirs: &TinbuildDirs) -> Result<Self, GlobalConfigError> {
        Self::load_from_path(&dirs.global_config_path())
    }

    /// Load global configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, GlobalConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = filesystem::read_file(path).map_err(|e| GlobalConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| GlobalConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Whether quiet mode is the default
    #[must_use]
    pub fn quiet(&self) -> bool {
        self.output.quiet.unwrap_or(false)
    }

    /// Whether verbose mode is the default
    #[must_use]
    pub fn verbose(&self) -> bool {
        self.output.verbose.unwrap_or(false)
    }
}
