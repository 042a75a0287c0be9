//! Playback of audio artifacts through rodio.
//!
//! Follows the [`PlaybackSignal`] while a clip plays: pause suspends the
//! sink in place, resume continues it, cancel drops it. The signal is
//! re-checked at least every `poll_interval`, and immediately when it changes.

use std::time::Duration;

use readaloud_core::{Artifact, BackendError, PlaybackBackend, PlaybackSignal, SignalState};

use crate::audio_thread::AudioThreadHandle;

/// [`PlaybackBackend`] on the default output device.
pub struct RodioPlayback {
    audio: AudioThreadHandle,
    poll_interval: Duration,
}

impl RodioPlayback {
    /// Open the default output device.
    pub fn new(poll_interval: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            audio: AudioThreadHandle::spawn()?,
            poll_interval,
        })
    }
}

impl PlaybackBackend for RodioPlayback {
    fn play(&self, artifact: &Artifact, signal: &PlaybackSignal) -> Result<(), BackendError> {
        let clip = self.audio.play(artifact.path().to_path_buf())?;
        let mut applied = SignalState::default();

        loop {
            let state = signal.snapshot();
            if state.cancelled {
                self.audio.stop(clip);
                tracing::debug!("Playback cancelled");
                return Ok(());
            }

            if state.paused != applied.paused {
                if state.paused {
                    self.audio.pause(clip);
                } else {
                    self.audio.resume(clip);
                }
            }
            applied = state;

            if !state.paused && self.audio.is_finished(clip)? {
                return Ok(());
            }

            signal.wait_change(state, self.poll_interval);
        }
    }
}
