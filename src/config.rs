// User configuration for the tasklist CLI

use crate::models::Priority;
use crate::store::DEFAULT_FILE_NAME;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "tasklist";

/// Overrides the config file location
pub const CONFIG_ENV: &str = "TASKLIST_CONFIG";

/// Overrides the task file location
pub const FILE_ENV: &str = "TASKLIST_FILE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Task file; relative paths resolve against the working directory
    pub file: Option<PathBuf>,
    /// Priority used by `add` when none is given
    pub default_priority: Priority,
    /// Log level when no `-v` flag is given
    pub log_level: Option<String>,
}

impl Config {
    /// Load the user's config file, or defaults when there is none
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => match default_config_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };
        Self::load_from(&path)
    }

    /// Load config from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content =
            fs::read_to_string(path).wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .wrap_err_with(|| format!("Failed to parse config file {}", path.display()))?;

        debug!(path = ?path, ?config, "Loaded config");
        Ok(config)
    }

    /// Pick the task file: explicit flag, then `TASKLIST_FILE`, then config,
    /// then `tasks.csv` in the working directory
    pub fn task_file(&self, flag: Option<&Path>) -> PathBuf {
        let env = std::env::var_os(FILE_ENV).filter(|v| !v.is_empty()).map(PathBuf::from);
        resolve_task_file(flag, env, self.file.as_deref())
    }

    /// Validated log level from the config file
    pub fn log_level(&self) -> Result<Option<tracing::Level>> {
        self.log_level
            .as_deref()
            .map(|level| {
                level
                    .parse::<tracing::Level>()
                    .map_err(|_| eyre!("Invalid log_level in config: {}", level))
            })
            .transpose()
    }
}

/// `<config_dir>/tasklist/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.yaml"))
}

fn resolve_task_file(flag: Option<&Path>, env: Option<PathBuf>, configured: Option<&Path>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or(env)
        .or_else(|| configured.map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_NAME))
}
