//! Ownership of synthesized audio files for one reading session.
//!
//! Every artifact a backend produces is registered here before it is played,
//! and removed (file deleted) as soon as playback finishes. Whatever is still
//! registered when the session ends, fails, is stopped or is abandoned is
//! deleted by [`ArtifactTracker::release_all`], which also runs on drop.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::ports::Artifact;

#[derive(Debug, Default)]
pub struct ArtifactTracker {
    outstanding: Mutex<Vec<Artifact>>,
}

impl ArtifactTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `artifact`.
    pub fn track(&self, artifact: Artifact) {
        tracing::trace!(path = %artifact.path().display(), "Tracking artifact");
        self.lock().push(artifact);
    }

    /// Stop tracking `artifact` and delete its file.
    ///
    /// The file is deleted even if it was never tracked.
    pub fn untrack(&self, artifact: &Artifact) {
        self.lock().retain(|tracked| tracked != artifact);
        discard(artifact);
    }

    /// Delete every outstanding artifact. Returns how many were released.
    ///
    /// Idempotent; deletion failures are logged and do not stop the sweep.
    pub fn release_all(&self) -> usize {
        let drained: Vec<Artifact> = std::mem::take(&mut *self.lock());
        for artifact in &drained {
            discard(artifact);
        }
        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "Released outstanding artifacts");
        }
        drained.len()
    }

    /// Number of artifacts currently tracked.
    pub fn outstanding(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Artifact>> {
        self.outstanding.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ArtifactTracker {
    fn drop(&mut self) {
        self.release_all();
    }
}

fn discard(artifact: &Artifact) {
    if let Err(e) = artifact.discard() {
        tracing::warn!(
            path = %artifact.path().display(),
            error = %e,
            "Failed to delete audio artifact"
        );
    }
}
