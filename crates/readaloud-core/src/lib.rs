//! Core of readaloud: turns document text into spoken sentences under user control.
//!
//! The crate owns everything that does not touch audio hardware or the network:
//!
//! - [`text`] splits raw text into [`Sentence`]s.
//! - [`ports`] defines the [`SynthesisBackend`] and [`PlaybackBackend`] traits that
//!   adapters (see `readaloud-audio`) implement.
//! - [`controller::ReadingController`] runs at most one [`session::ReadingSession`] at a
//!   time on a dedicated worker thread, with pause/resume/stop and race-free
//!   [`SessionStatus`] polling.
//! - [`artifact::ArtifactTracker`] guarantees synthesized audio files are deleted on
//!   every exit path.

pub mod artifact;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod ports;
pub mod session;
pub mod settings;
pub mod signal;
pub mod status;
pub mod text;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use artifact::ArtifactTracker;
pub use config::{ConfigError, ReaderConfig, default_config_path};
pub use controller::{ReadingController, StartOutcome};
pub use error::ReaderError;
pub use events::ReadingEvent;
pub use ports::{Artifact, BackendError, PlaybackBackend, SynthesisBackend};
pub use settings::{
    DEFAULT_LANGUAGE, MAX_SPEED, MIN_SPEED, ReadingSettings, SUPPORTED_LANGUAGES, SettingsError,
};
pub use signal::{PlaybackSignal, SignalState};
pub use status::{ReadingState, SessionStatus};
pub use text::{SAMPLE_TEXT, Sentence, compose_chapters, segment};
