//! Backend ports: the seams between the reading controller and the outside world.
//!
//! Synthesis turns one sentence into an audio [`Artifact`] on disk; playback plays
//! an artifact while honouring a [`PlaybackSignal`]. Both are blocking calls made
//! from the session worker thread, never from the caller of the controller.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::settings::ReadingSettings;
use crate::signal::PlaybackSignal;

/// A synthesized audio file owned by the reading session that produced it.
///
/// Artifacts are deleted through [`crate::ArtifactTracker`]; backends only create them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    path: PathBuf,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the audio file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file. A file that is already gone counts as deleted.
    pub fn discard(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Errors reported by synthesis and playback backends.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend cannot be used on this machine (missing binary, no device).
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// A remote synthesis request failed.
    #[error("Synthesis request failed: {0}")]
    Request(String),

    /// Audio data could not be decoded.
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    /// The output device failed during playback.
    #[error("Audio device error: {0}")]
    Device(String),

    /// Artifact file could not be written or read.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Converts sentence text into an audio artifact.
#[cfg_attr(test, mockall::automock)]
pub trait SynthesisBackend: Send + Sync {
    /// Synthesize `text` with the session's settings.
    ///
    /// Blocks until the artifact is fully written.
    fn synthesize(&self, text: &str, settings: &ReadingSettings)
    -> Result<Artifact, BackendError>;
}

/// Plays audio artifacts.
#[cfg_attr(test, mockall::automock)]
pub trait PlaybackBackend: Send + Sync {
    /// Play `artifact` to completion.
    ///
    /// Implementations must suspend output while `signal` is paused and continue
    /// from the same position on resume, and must return promptly once `signal`
    /// is cancelled. Returning `Ok` after cancellation is expected.
    fn play(&self, artifact: &Artifact, signal: &PlaybackSignal) -> Result<(), BackendError>;
}
