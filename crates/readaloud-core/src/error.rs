//! Reading controller error types.

use std::time::Duration;

use crate::ports::BackendError;
use crate::settings::SettingsError;

/// Errors returned by the reading controller or recorded on a failed session.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// Settings rejected before a session was created.
    #[error("Invalid reading settings: {0}")]
    InvalidSettings(#[from] SettingsError),

    /// Synthesis failed for the sentence at `index`.
    #[error("Speech synthesis failed at sentence {}: {source}", .index + 1)]
    Synthesis { index: usize, source: BackendError },

    /// Playback failed for the sentence at `index`.
    #[error("Playback failed at sentence {}: {source}", .index + 1)]
    Playback { index: usize, source: BackendError },

    /// The worker did not finish within the stop timeout and was abandoned.
    #[error("Reading session did not stop within {waited:?}")]
    StopTimeout { waited: Duration },

    /// The worker thread could not be started.
    #[error("Failed to start reading worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// The worker thread panicked.
    #[error("Reading worker panicked")]
    WorkerPanicked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentence_numbers_are_one_based() {
        let err = ReaderError::Synthesis {
            index: 2,
            source: BackendError::Request("HTTP 503".into()),
        };
        assert_eq!(
            err.to_string(),
            "Speech synthesis failed at sentence 3: Synthesis request failed: HTTP 503"
        );
    }
}
