//! Loop configuration (`relive.toml`)
//!
//! Loaded from an explicit path or from the platform config directory.
//! Every field has a default, so an empty or missing file is a valid config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::snapshot::{DEFAULT_SLOT_COUNT, MAX_SLOT_COUNT};

/// File name used inside [`config_dir`]
pub const CONFIG_FILE: &str = "relive.toml";

/// Errors raised while loading, saving or validating a [`LoopConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read or write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LoopConfig {
    /// Snapshot store settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Session settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// Snapshot store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Number of snapshot slots (default: 4)
    #[serde(default = "default_slot_count")]
    pub slot_count: usize,
    /// Directory holding state files and input logs (default: `<data dir>/loops`)
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Slot the record/playback toggle uses (default: 0)
    #[serde(default)]
    pub default_slot: u32,
}

fn default_slot_count() -> usize {
    DEFAULT_SLOT_COUNT
}

/// `<data dir>/loops`, or `./loops` when no home directory is known
pub fn default_directory() -> PathBuf {
    data_dir()
        .map(|dir| dir.join("loops"))
        .unwrap_or_else(|| PathBuf::from("loops"))
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            slot_count: default_slot_count(),
            directory: default_directory(),
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Linux: `~/.config/relive`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.relive", "", "Relive")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory.
///
/// On Linux: `~/.local/share/relive`
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.relive", "", "Relive")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Default location of the config file, if a home directory is known
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

impl LoopConfig {
    /// Load from `path`
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// read or parsed is an error rather than being silently ignored.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write to `path` as pretty TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, content).map_err(io_err)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.slot_count == 0 {
            return Err(ConfigError::Invalid(
                "store.slot_count must be at least 1".to_string(),
            ));
        }
        if self.store.slot_count > MAX_SLOT_COUNT {
            return Err(ConfigError::Invalid(format!(
                "store.slot_count {} exceeds the maximum of {MAX_SLOT_COUNT}",
                self.store.slot_count
            )));
        }
        if self.session.default_slot as usize >= self.store.slot_count {
            return Err(ConfigError::Invalid(format!(
                "session.default_slot {} is out of range for {} slots",
                self.session.default_slot, self.store.slot_count
            )));
        }
        Ok(())
    }
}
