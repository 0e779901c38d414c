use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tool configuration, read from an optional TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Version stamp for saved hives; the host OS version when unset.
    pub stamp: Option<Stamp>,
    pub dump: DumpConfig,
}

/// OS major/minor recorded in a saved hive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub major: u32,
    pub minor: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpConfig {
    pub format: Format,
    /// Levels below the starting key to descend; unlimited when unset.
    pub max_depth: Option<usize>,
    /// Include decoded value payloads.
    pub show_data: bool,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            format: Format::Text,
            max_depth: None,
            show_data: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Json,
}

impl ToolConfig {
    /// Load from `path`, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let cfg_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg: ToolConfig = toml::from_str(&cfg_str)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;

        log::info!("Using config from: {}", path.display());
        Ok(cfg)
    }
}
