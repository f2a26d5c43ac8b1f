//! `hourgrid.toml` loading
//!
//! ```toml
//! [input]
//! settings = "settings.json"
//! machines = "machines.json"
//! jobs = "jobs.json"
//! resources = "resources.json"
//!
//! [output]
//! file_name = "schedule.xlsx"
//! sheet_name = "Sheet 1"
//! highlight_color = "BFB1D1"
//! text_column_width = 12
//! ```
//!
//! Every key is optional; a missing file means all defaults.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// Payload file names inside the data directory
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub settings: String,
    pub machines: String,
    pub jobs: String,
    pub resources: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            settings: "settings.json".into(),
            machines: "machines.json".into(),
            jobs: "jobs.json".into(),
            resources: "resources.json".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Workbook path used when `--output` is not given
    pub file_name: String,
    pub sheet_name: String,
    /// `RRGGBB`, with or without a leading `#`
    pub highlight_color: String,
    pub text_column_width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: "schedule.xlsx".into(),
            sheet_name: "Sheet 1".into(),
            highlight_color: "BFB1D1".into(),
            text_column_width: 12,
        }
    }
}

impl OutputConfig {
    /// Highlight color as `0xRRGGBB`
    pub fn highlight_rgb(&self) -> Result<u32> {
        let hex = self.highlight_color.trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("highlight_color must be six hex digits, got {:?}", self.highlight_color);
        }
        u32::from_str_radix(hex, 16)
            .with_context(|| format!("highlight_color {:?} is not hex", self.highlight_color))
    }
}

impl Config {
    /// Parse a config file, or fall back to defaults when there is none
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("no config file given, using defaults");
            return Ok(Self::default());
        };
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;

        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.output.highlight_rgb()?;
        Ok(config)
    }
}
