//! Audio adapters for readaloud.
//!
//! Implements the ports defined in `readaloud-core`:
//!
//! - [`backend`] provides [`SynthesisBackend`](readaloud_core::SynthesisBackend)
//!   implementations (Google Translate, espeak-ng) selected by [`SynthesisEngine`].
//! - [`playback::RodioPlayback`] plays artifacts on the default output device,
//!   with the device confined to [`audio_thread`].
//! - [`artifact_dir::ArtifactDir`] names the files backends write.

pub mod artifact_dir;
pub mod audio_thread;
pub mod backend;
pub mod playback;

// Re-export key types for convenience
pub use artifact_dir::ArtifactDir;
pub use backend::{EspeakSynthesis, GoogleTranslateTts, SynthesisEngine, UnknownEngine};
pub use playback::RodioPlayback;
