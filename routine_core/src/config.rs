//! Configuration file support for the routine tools.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/routine/config.toml`.

use crate::tracker::ResetPolicy;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub tracker: TrackerConfig,
}

/// Where routine documents live
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_routines_dir")]
    pub routines_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            routines_dir: default_routines_dir(),
        }
    }
}

/// Reset tracking parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Maximum history entries kept per routine
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default)]
    pub reset_policy: ResetPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            reset_policy: ResetPolicy::default(),
        }
    }
}

// Default value functions
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_routines_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_dir().join(".local/share"));
    base.join("routine")
}

pub(crate) fn default_history_limit() -> usize {
    30
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_dir().join(".config"));
        base.join("routine").join("config.toml")
    }

    /// Reject values the tracker cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.tracker.history_limit == 0 {
            return Err(Error::Config(
                "tracker.history_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
