//! Configuration for the hostlet shell
//!
//! Handles loading and validating the shell configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use hostlet_core::LogLevel;
use hostlet_isolation::ModuleLayout;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur in configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is out of range or inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// User preferences applied to the host window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Keep the title bar visible over full-screen surfaces
    #[serde(default)]
    pub always_show_chrome: bool,

    /// Keep the screen on while the window is shown
    #[serde(default)]
    pub keep_screen_on: bool,

    /// Full title bar height in pixels
    #[serde(default = "default_base_chrome_height")]
    pub base_chrome_height: u32,

    /// Divisor applied to the title bar height over full-screen surfaces
    #[serde(default = "default_reduced_chrome_ratio")]
    pub reduced_chrome_ratio: f64,
}

fn default_base_chrome_height() -> u32 {
    56
}

fn default_reduced_chrome_ratio() -> f64 {
    1.5
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            always_show_chrome: false,
            keep_screen_on: false,
            base_chrome_height: default_base_chrome_height(),
            reduced_chrome_ratio: default_reduced_chrome_ratio(),
        }
    }
}

impl Preferences {
    /// Title bar height over full-screen surfaces.
    pub fn reduced_chrome_height(&self) -> u32 {
        (f64::from(self.base_chrome_height) / self.reduced_chrome_ratio) as u32
    }
}

/// Shell configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Private data directory holding the working directories
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Cache directory emptied at session creation
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// Module and working area file names
    #[serde(default)]
    pub layout: ModuleLayout,

    /// Window preferences
    #[serde(default)]
    pub preferences: Preferences,

    /// Log level of the shell
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_data_dir() -> String {
    "./hostlet-data".to_string()
}

fn default_cache_dir() -> String {
    "./hostlet-data/cache".to_string()
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cache_dir: default_cache_dir(),
            layout: ModuleLayout::default(),
            preferences: Preferences::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl ShellConfig {
    /// Load configuration from a TOML file
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = ShellConfig::default();

        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());

            if !path.exists() {
                warn!("Configuration file not found: {}", path.display());
                return Ok(config);
            }

            let content = fs::read_to_string(path).with_context(|| {
                format!("Failed to read configuration file: {}", path.display())
            })?;

            config = toml::from_str(&content).with_context(|| {
                format!("Failed to parse configuration file: {}", path.display())
            })?;
        } else {
            info!("No configuration file specified, using defaults");
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.is_empty() {
            return Err(ConfigError::Invalid("Data directory cannot be empty".to_string()).into());
        }

        let layout = &self.layout;
        let names = [
            ("manifest_file", &layout.manifest_file),
            ("module_file", &layout.module_file),
            ("resource_dir", &layout.resource_dir),
            ("staging_dir", &layout.staging_dir),
            ("scratch_dir", &layout.scratch_dir),
        ];
        for (field, value) in names {
            if value.is_empty() {
                return Err(
                    ConfigError::Invalid(format!("layout.{} cannot be empty", field)).into(),
                );
            }
        }

        if layout.staging_dir == layout.scratch_dir {
            return Err(ConfigError::Invalid(
                "Staging and scratch directories must differ".to_string(),
            )
            .into());
        }

        let ratio = self.preferences.reduced_chrome_ratio;
        if !ratio.is_finite() || ratio < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "Reduced chrome ratio must be at least 1.0, got {}",
                ratio
            ))
            .into());
        }

        if self.preferences.base_chrome_height == 0 {
            warn!("Base chrome height is zero; the title bar will never be visible");
        }

        Ok(())
    }

    /// Merge with another configuration
    pub fn merge(&mut self, other: ShellConfig) {
        if !other.data_dir.is_empty() {
            self.data_dir = other.data_dir;
        }

        if !other.cache_dir.is_empty() {
            self.cache_dir = other.cache_dir;
        }

        self.layout = other.layout;

        if other.preferences.always_show_chrome {
            self.preferences.always_show_chrome = true;
        }
        if other.preferences.keep_screen_on {
            self.preferences.keep_screen_on = true;
        }
        if other.preferences.base_chrome_height > 0 {
            self.preferences.base_chrome_height = other.preferences.base_chrome_height;
        }
        self.preferences.reduced_chrome_ratio = other.preferences.reduced_chrome_ratio;

        self.log_level = other.log_level;
    }
}
