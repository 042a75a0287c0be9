//! Directory where synthesis backends write audio artifacts.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use readaloud_core::{Artifact, BackendError, ReaderConfig};

/// Allocates uniquely named audio files in one directory.
///
/// Files are created with a `readaloud-` prefix and are never deleted here;
/// the session's artifact tracker owns them once they are returned.
#[derive(Debug, Clone)]
pub struct ArtifactDir {
    root: PathBuf,
}

impl ArtifactDir {
    /// Use `root`, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Use the directory resolved from `config`.
    pub fn from_config(config: &ReaderConfig) -> Result<Self, BackendError> {
        let root = config.resolve_artifact_dir();
        tracing::debug!(path = %root.display(), "Using artifact directory");
        Self::new(root)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Reserve an empty file with the given extension for a tool to write into.
    pub fn allocate(&self, extension: &str) -> Result<Artifact, BackendError> {
        let file = Self::builder(extension).tempfile_in(&self.root)?;
        let path = file.into_temp_path().keep().map_err(|e| e.error)?;
        Ok(Artifact::new(path))
    }

    /// Write `bytes` to a new file with the given extension.
    pub fn write(&self, extension: &str, bytes: &[u8]) -> Result<Artifact, BackendError> {
        let mut file = Self::builder(extension).tempfile_in(&self.root)?;
        file.write_all(bytes)?;
        file.flush()?;
        let (_, path) = file.keep().map_err(|e| e.error)?;
        Ok(Artifact::new(path))
    }

    fn builder(extension: &str) -> tempfile::Builder<'static, 'static> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("readaloud-");
        builder.suffix(extension_suffix(extension));
        builder
    }
}

fn extension_suffix(extension: &str) -> &'static str {
    match extension {
        "mp3" => ".mp3",
        "wav" => ".wav",
        _ => ".audio",
    }
}
