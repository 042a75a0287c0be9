//! Reader configuration.
//!
//! Stored as JSON. Every field has a default, so a partial or missing file is
//! fine; [`ReaderConfig::validate`] rejects values the controller cannot work with.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::{ReadingSettings, SettingsError};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "READALOUD_CONFIG";

/// Environment variable overriding where audio artifacts are written.
pub const ARTIFACT_DIR_ENV: &str = "READALOUD_ARTIFACT_DIR";

/// Default bound on how long `stop` waits for the worker.
pub const DEFAULT_STOP_TIMEOUT_MS: u64 = 2000;

/// Default interval at which playback re-checks pause/cancel.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Default timeout for a single remote synthesis request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

const MIN_POLL_INTERVAL_MS: u64 = 10;
const MAX_POLL_INTERVAL_MS: u64 = 200;

/// Reader configuration loaded from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Default voice settings for new sessions.
    pub reading: ReadingSettings,

    /// How long `stop` waits for the worker before abandoning it.
    pub stop_timeout_ms: u64,

    /// Playback pause/cancel reaction interval.
    pub poll_interval_ms: u64,

    /// Timeout for one synthesis request to a remote service.
    pub request_timeout_secs: u64,

    /// Where synthesized audio is written. See [`ReaderConfig::resolve_artifact_dir`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_dir: Option<PathBuf>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            reading: ReadingSettings::default(),
            stop_timeout_ms: DEFAULT_STOP_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            artifact_dir: None,
        }
    }
}

impl ReaderConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
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

        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reading.validate()?;
        if self.stop_timeout_ms == 0 {
            return Err(ConfigError::ZeroStopTimeout);
        }
        if !(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&self.poll_interval_ms) {
            return Err(ConfigError::InvalidPollInterval(self.poll_interval_ms));
        }
        Ok(())
    }

    pub const fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Directory for synthesized audio.
    ///
    /// Resolution order:
    /// 1. `artifact_dir` from the config file
    /// 2. `READALOUD_ARTIFACT_DIR` environment variable
    /// 3. `<system temp>/readaloud`
    pub fn resolve_artifact_dir(&self) -> PathBuf {
        pick_artifact_dir(self.artifact_dir.as_deref(), env::var_os(ARTIFACT_DIR_ENV))
    }
}

/// Config file location when none is given on the command line.
///
/// Resolution order:
/// 1. `READALOUD_CONFIG` environment variable
/// 2. `<config dir>/readaloud/config.json` (e.g. `~/.config/readaloud/config.json`)
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(config_dir.join("readaloud").join("config.json"))
}

fn pick_artifact_dir(configured: Option<&Path>, from_env: Option<std::ffi::OsString>) -> PathBuf {
    if let Some(dir) = configured {
        return dir.to_path_buf();
    }
    if let Some(dir) = from_env.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    env::temp_dir().join("readaloud")
}

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("stop_timeout_ms must be greater than zero")]
    ZeroStopTimeout,

    #[error("poll_interval_ms must be between 10 and 200, got {0}")]
    InvalidPollInterval(u64),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Could not determine the user config directory")]
    NoConfigDir,

    #[error("Failed to access config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
