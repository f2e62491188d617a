//! Persisted settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User settings, persisted as JSON. Unknown fields are ignored and
/// missing fields take defaults, so the file survives version skew.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Save here without asking when set; otherwise a save dialog is
    /// required.
    pub default_directory: Option<PathBuf>,
    /// Keep non-ASCII characters in file names.
    pub allow_unicode: bool,
    /// Overwrite on name collision instead of suffixing `-1`, `-2`, ...
    pub overwrite_files: bool,
    /// Show status messages for download lifecycle events.
    pub display_status: bool,
    /// Base status display duration in seconds.
    pub status_duration_secs: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_directory: None,
            allow_unicode: true,
            overwrite_files: false,
            display_status: true,
            status_duration_secs: 2.5,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write settings at {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings at {} are not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Settings {
    /// Loads settings from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
