use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TaskError};

/// Config directory (`~/.config/weektasks`), overridable with
/// `WEEKTASKS_CONFIG_DIR`.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("WEEKTASKS_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .map(|d| d.join("weektasks"))
        .unwrap_or_else(|| PathBuf::from(".weektasks"))
}

/// Where the task blob lives (`~/.local/share/weektasks` on Linux),
/// overridable with `WEEKTASKS_DATA_DIR`.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("WEEKTASKS_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|d| d.join("weektasks"))
        .unwrap_or_else(|| PathBuf::from(".weektasks"))
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub data_dir: PathBuf,
    /// `tracing` filter directive, e.g. `info` or `weektasks=debug`.
    pub log_level: String,
    /// Defaults to `<data_dir>/weektasks.log`.
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: data_dir(),
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Settings {
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| TaskError::Config(e.to_string()))
    }

    /// An explicit path must exist; the default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    debug!(path = %path.display(), "loading settings");
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("weektasks.log"))
    }
}
