//! Configuration file support for onenote-export.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/onenote-export/config.toml`. Settings cover where OneNote is
//! installed, how the automation bridge is invoked, icon sizes, and which destinations
//! are switched off.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod types;

pub use types::{AutomationConfig, DestinationsConfig, IconConfig, OneNoteConfig};

use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::capture::file::is_valid_template;

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [onenote]
/// executable_name = "ONENOTE.EXE"
/// search_dirs = ['C:\Program Files\Microsoft Office\root\Office16']
///
/// [automation]
/// command = "onenote-bridge"
/// filename_template = "capture_%Y-%m-%d_%H%M%S"
///
/// [icon]
/// size = 16
/// high_res_size = 32
///
/// [destinations]
/// excluded = []
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// OneNote installation lookup
    #[serde(default)]
    pub onenote: OneNoteConfig,

    /// Automation bridge invocation
    #[serde(default)]
    pub automation: AutomationConfig,

    /// Destination icon settings
    #[serde(default)]
    pub icon: IconConfig,

    /// Destination selection
    #[serde(default)]
    pub destinations: DestinationsConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Validated ranges:
    /// - `icon.size`: 8 - 256
    /// - `icon.high_res_size`: 8 - 256, and never smaller than `icon.size`
    fn validate_and_clamp(&mut self) {
        if self.onenote.executable_name.trim().is_empty() {
            log::warn!("Empty onenote.executable_name, falling back to 'ONENOTE.EXE'");
            self.onenote.executable_name = OneNoteConfig::default().executable_name;
        }

        if self.automation.command.trim().is_empty() {
            log::warn!("Empty automation.command, falling back to 'onenote-bridge'");
            self.automation.command = AutomationConfig::default().command;
        }

        if !is_valid_template(&self.automation.filename_template) {
            log::warn!(
                "Invalid filename_template '{}', falling back to default",
                self.automation.filename_template
            );
            self.automation.filename_template = types::default_filename_template();
        }

        if !(8..=256).contains(&self.icon.size) {
            log::warn!("Invalid icon size {}, clamping to 8-256 range", self.icon.size);
            self.icon.size = self.icon.size.clamp(8, 256);
        }

        if !(8..=256).contains(&self.icon.high_res_size) {
            log::warn!(
                "Invalid icon high_res_size {}, clamping to 8-256 range",
                self.icon.high_res_size
            );
            self.icon.high_res_size = self.icon.high_res_size.clamp(8, 256);
        }

        if self.icon.high_res_size < self.icon.size {
            log::warn!(
                "icon high_res_size {} is smaller than size {}, raising it",
                self.icon.high_res_size,
                self.icon.size
            );
            self.icon.high_res_size = self.icon.size;
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/onenote-export/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("onenote-export");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from file, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from an explicit path, or returns defaults if it doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or contains invalid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Saves the current configuration to file.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, the config cannot be
    /// serialized, or the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    /// Saves the configuration to an explicit path, creating parent directories.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// Creates a default configuration file with documentation comments.
    ///
    /// # Errors
    /// Returns an error if a config file already exists at the target path or
    /// the file cannot be written.
    pub fn create_default_file() -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            return Err(anyhow::anyhow!(
                "Config file already exists at {}",
                config_path.display()
            ));
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let default_config = include_str!("../../config.example.toml");
        fs::write(&config_path, default_config)?;

        info!("Created default config at {}", config_path.display());
        Ok(config_path)
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}
