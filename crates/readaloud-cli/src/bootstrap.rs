//! CLI bootstrap - the composition root.
//!
//! The only place where concrete backends are wired into the reading
//! controller: synthesis engine and artifact directory from `readaloud-audio`,
//! rodio playback, and the configuration loaded from disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use readaloud_audio::{ArtifactDir, RodioPlayback, SynthesisEngine};
use readaloud_core::{ReaderConfig, ReadingController, ReadingEvent, default_config_path};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::CliError;

/// Configuration as loaded for this invocation.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// File the configuration was loaded from (it may not exist).
    pub path: PathBuf,
    pub reader: ReaderConfig,
}

impl CliConfig {
    /// Load from `explicit`, or from the default location.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };
        let reader = ReaderConfig::load(&path)?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(Self { path, reader })
    }
}

/// Everything `readaloud read` needs.
pub struct ReaderContext {
    pub controller: ReadingController,
    pub events: UnboundedReceiver<ReadingEvent>,
}

/// Build a controller over `engine` and the default output device.
pub fn bootstrap(
    config: &ReaderConfig,
    engine: SynthesisEngine,
) -> Result<ReaderContext, CliError> {
    let artifacts = ArtifactDir::from_config(config)?;
    let synthesis = engine.build(artifacts, config)?;
    let playback = Arc::new(RodioPlayback::new(config.poll_interval())?);
    let (controller, events) = ReadingController::new(synthesis, playback, config);
    Ok(ReaderContext { controller, events })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_explicit_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.path, path);
        assert_eq!(config.reader, ReaderConfig::default());
    }

    #[test]
    fn test_load_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"stop_timeout_ms": 0}"#).unwrap();
        let err = CliConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
