//! Shell configuration loaded from TOML.
//!
//! ```toml
//! prompt = "shell $ "
//! greeting = "Welcome to mini-shell"
//! log_level = "warn"
//! log_file = "/tmp/minishell.log"
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_PROMPT: &str = "shell $ ";
const DEFAULT_GREETING: &str = "Welcome to mini-shell";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Printed before every interactive read.
    pub prompt: String,
    /// Printed once when the interactive loop starts. Empty disables it.
    pub greeting: String,
    pub log_level: LevelFilter,
    /// Append log records here instead of writing them to stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            log_level: LevelFilter::Warn,
            log_file: None,
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// `~/.config/minishell/config.toml` under the given home directory.
    pub fn default_path(home: &Path) -> PathBuf {
        home.join(".config/minishell/config.toml")
    }

    /// Load the explicit file if given, else the per-user file if it exists.
    ///
    /// With neither, the built-in defaults are returned.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let Some(home) = std::env::var_os("HOME") else {
            return Ok(Self::default());
        };
        let path = Self::default_path(Path::new(&home));
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn greeting(&self) -> Option<&str> {
        if self.greeting.is_empty() {
            None
        } else {
            Some(&self.greeting)
        }
    }
}
