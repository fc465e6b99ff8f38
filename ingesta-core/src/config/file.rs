//! Optional TOML configuration file.
//!
//! Every key is optional; anything missing falls back to the builder's
//! defaults, and command-line flags override whatever the file sets.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

/// Settings read from a TOML configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub workers: Option<usize>,
    pub probe_timeout_secs: Option<u64>,
    pub transcode_timeout_secs: Option<u64>,
    /// Also write `.xlsx` workbooks
    pub workbooks: Option<bool>,
    pub tools: ToolSettings,
    pub proxy: ProxySettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSettings {
    pub ffprobe: Option<PathBuf>,
    pub ffmpeg: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxySettings {
    pub width: Option<u32>,
    pub crf: Option<u8>,
    pub preset: Option<String>,
}

impl FileSettings {
    /// Parses settings from TOML text.
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!(
                "Failed to read configuration file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&text)
    }
}
