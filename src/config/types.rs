//! Configuration type definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::capture::file::DEFAULT_FILENAME_TEMPLATE;

/// Where to find the OneNote executable.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OneNoteConfig {
    /// File name of the OneNote executable (matched case-insensitively)
    #[serde(default = "default_executable_name")]
    pub executable_name: String,

    /// Explicit path to the executable; skips the directory search when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable_path: Option<PathBuf>,

    /// Directories searched before `PATH`
    #[serde(default = "default_search_dirs")]
    pub search_dirs: Vec<PathBuf>,
}

impl Default for OneNoteConfig {
    fn default() -> Self {
        Self {
            executable_name: default_executable_name(),
            executable_path: None,
            search_dirs: default_search_dirs(),
        }
    }
}

/// Settings for the automation bridge command.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AutomationConfig {
    /// Program that talks to OneNote's automation interface
    #[serde(default = "default_command")]
    pub command: String,

    /// Extra arguments placed before every bridge subcommand
    #[serde(default)]
    pub args: Vec<String>,

    /// Name template (chrono format specifiers) for staged capture files
    #[serde(default = "default_filename_template")]
    pub filename_template: String,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: Vec::new(),
            filename_template: default_filename_template(),
        }
    }
}

/// Destination icon settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IconConfig {
    /// Icon resource index inside the executable
    #[serde(default)]
    pub index: u32,

    /// Icon edge length in pixels for normal density displays (valid range: 8 - 256)
    #[serde(default = "default_icon_size")]
    pub size: u32,

    /// Icon edge length in pixels for high density displays (valid range: 8 - 256)
    #[serde(default = "default_high_res_icon_size")]
    pub high_res_size: u32,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            index: 0,
            size: default_icon_size(),
            high_res_size: default_high_res_icon_size(),
        }
    }
}

/// Which destinations the user has switched off.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DestinationsConfig {
    /// Designations of excluded destinations (e.g. "OneNote")
    #[serde(default)]
    pub excluded: Vec<String>,
}

impl DestinationsConfig {
    /// Base activation flag for a destination kind.
    pub fn is_enabled(&self, designation: &str) -> bool {
        !self
            .excluded
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(designation))
    }
}

fn default_executable_name() -> String {
    "ONENOTE.EXE".to_string()
}

fn default_search_dirs() -> Vec<PathBuf> {
    [
        r"C:\Program Files\Microsoft Office\root\Office16",
        r"C:\Program Files (x86)\Microsoft Office\root\Office16",
        r"C:\Program Files\Microsoft Office\Office16",
        r"C:\Program Files (x86)\Microsoft Office\Office16",
        r"C:\Program Files\Microsoft Office\Office15",
        r"C:\Program Files (x86)\Microsoft Office\Office15",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

fn default_command() -> String {
    "onenote-bridge".to_string()
}

pub(super) fn default_filename_template() -> String {
    DEFAULT_FILENAME_TEMPLATE.to_string()
}

fn default_icon_size() -> u32 {
    16
}

fn default_high_res_icon_size() -> u32 {
    32
}
