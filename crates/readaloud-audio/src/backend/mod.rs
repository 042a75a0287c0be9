//! Synthesis backends implementing [`SynthesisBackend`].
//!
//! | Engine   | Module     | Output | Needs              |
//! |----------|------------|--------|--------------------|
//! | `google` | [`google`] | MP3    | network            |
//! | `espeak` | [`espeak`] | WAV    | `espeak-ng` binary |

pub mod espeak;
pub mod google;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use readaloud_core::{BackendError, ReaderConfig, SynthesisBackend};

use crate::artifact_dir::ArtifactDir;

pub use espeak::EspeakSynthesis;
pub use google::GoogleTranslateTts;

/// Which synthesis engine to read with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SynthesisEngine {
    /// Google Translate voices (online).
    #[default]
    Google,

    /// espeak-ng voices (offline).
    Espeak,
}

impl SynthesisEngine {
    pub const ALL: [Self; 2] = [Self::Google, Self::Espeak];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Espeak => "espeak",
        }
    }

    /// Build the engine, writing artifacts into `artifacts`.
    pub fn build(
        self,
        artifacts: ArtifactDir,
        config: &ReaderConfig,
    ) -> Result<Arc<dyn SynthesisBackend>, BackendError> {
        tracing::info!(engine = %self, "Initializing synthesis backend");
        Ok(match self {
            Self::Google => Arc::new(GoogleTranslateTts::new(artifacts, config.request_timeout())?),
            Self::Espeak => Arc::new(EspeakSynthesis::new(artifacts)),
        })
    }
}

impl fmt::Display for SynthesisEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SynthesisEngine {
    type Err = UnknownEngine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|engine| engine.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownEngine(s.to_string()))
    }
}

/// Error for an engine name that is not one of [`SynthesisEngine::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown synthesis engine '{0}' (expected 'google' or 'espeak')")]
pub struct UnknownEngine(pub String);
