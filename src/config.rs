use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::prioritize::GoalsPolicy;
use crate::{aflog_debug, Error, Result};

/// Default generator timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the JSON collections. Defaults to `~/.agileflow/data`.
    pub data_dir: Option<String>,
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
    /// Explicit path to the `claude` binary; looked up in PATH otherwise.
    pub claude_binary: Option<String>,
    pub model: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub goals_policy: GoalsPolicy,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            seed_demo_data: true,
            claude_binary: None,
            model: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            goals_policy: GoalsPolicy::default(),
        }
    }
}

impl Config {
    pub fn home_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".agileflow"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("agileflow.toml"))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(expand_tilde(dir)),
            None => Ok(Self::home_dir()?.join("data")),
        }
    }

    pub fn claude_binary(&self) -> Option<PathBuf> {
        self.claude_binary.as_deref().map(expand_tilde)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        aflog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            aflog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        aflog_debug!(
            "Config loaded: data_dir={:?}, model={:?}, timeout_secs={}, goals_policy={:?}",
            config.data_dir,
            config.model,
            config.timeout_secs,
            config.goals_policy
        );
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                aflog_debug!("Creating config directory: {}", dir.display());
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        aflog_debug!("Config saved to {}", path.display());
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
