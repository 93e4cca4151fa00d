use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// The public chirp deployment; its `/api/tweet/<id>` endpoint serves the
/// tweet schema this widget renders.
pub const DEFAULT_BASE_URL: &str = "https://chirp.alexandru.so";

const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub base_url: String,
    pub timeout_secs: u64,
    pub state_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            state_file: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the default location
    /// (`~/.config/chirp/config.toml`). A missing file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Where the synchronized state snapshot lives.
    pub fn state_path(&self) -> Option<PathBuf> {
        self.state_file
            .clone()
            .or_else(|| dirs::data_local_dir().map(|d| d.join("chirp").join("state.json")))
    }

    /// The TUI owns the terminal, so logs go to a file.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| dirs::data_local_dir().map(|d| d.join("chirp").join("chirp.log")))
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chirp").join("config.toml"))
}
