//! One reading run: sentence list, position, settings snapshot and worker loop.
//!
//! A session is created by [`crate::ReadingController::start_reading`] and never
//! reused. Its progress (state, index, error) lives behind a single mutex so a
//! status read always sees a consistent triple. The worker loop runs on its own
//! thread and owns no state the controller cannot see.

use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::artifact::ArtifactTracker;
use crate::error::ReaderError;
use crate::events::{EventSink, ReadingEvent};
use crate::ports::{PlaybackBackend, SynthesisBackend};
use crate::settings::ReadingSettings;
use crate::signal::PlaybackSignal;
use crate::status::{ReadingState, SessionStatus};
use crate::text::Sentence;

#[derive(Debug)]
struct Progress {
    state: ReadingState,
    current_index: usize,
    error: Option<String>,
}

/// How a worker loop ended.
#[derive(Debug)]
pub(crate) enum Outcome {
    Completed,
    Cancelled,
    Failed(ReaderError),
}

/// A single reading run.
#[derive(Debug)]
pub struct ReadingSession {
    id: u64,
    sentences: Vec<Sentence>,
    settings: ReadingSettings,
    progress: Mutex<Progress>,
    signal: PlaybackSignal,
    artifacts: ArtifactTracker,
    events: EventSink,
}

impl ReadingSession {
    /// Create a session that is already in [`ReadingState::Reading`].
    pub(crate) fn new(
        id: u64,
        sentences: Vec<Sentence>,
        settings: ReadingSettings,
        events: EventSink,
    ) -> Self {
        Self {
            id,
            sentences,
            settings,
            progress: Mutex::new(Progress {
                state: ReadingState::Reading,
                current_index: 0,
                error: None,
            }),
            signal: PlaybackSignal::new(),
            artifacts: ArtifactTracker::new(),
            events,
        }
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.sentences.len()
    }

    #[must_use]
    pub fn state(&self) -> ReadingState {
        self.lock().state
    }

    /// Consistent snapshot of this session.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        let progress = self.lock();
        SessionStatus {
            is_reading: progress.state.is_active(),
            is_paused: progress.state == ReadingState::Paused,
            current_index: progress.current_index,
            total: self.sentences.len(),
            state: progress.state,
            error: progress.error.clone(),
        }
    }

    // ── Control (called by the controller) ─────────────────────────

    pub(crate) fn announce(&self) {
        tracing::info!(session = self.id, total = self.total(), "Reading started");
        self.emit_state(ReadingState::Reading);
    }

    /// `Reading → Paused`. Any other state is left alone.
    pub(crate) fn pause(&self) {
        let mut progress = self.lock();
        if progress.state == ReadingState::Reading {
            progress.state = ReadingState::Paused;
            self.signal.pause();
            drop(progress);
            tracing::info!(session = self.id, "Reading paused");
            self.emit_state(ReadingState::Paused);
        }
    }

    /// `Paused → Reading`. Any other state is left alone.
    pub(crate) fn resume(&self) {
        let mut progress = self.lock();
        if progress.state == ReadingState::Paused {
            progress.state = ReadingState::Reading;
            self.signal.resume();
            drop(progress);
            tracing::info!(session = self.id, "Reading resumed");
            self.emit_state(ReadingState::Reading);
        }
    }

    /// Pause if reading, resume if paused. Returns whether the session is now paused.
    pub(crate) fn toggle_pause(&self) -> bool {
        match self.state() {
            ReadingState::Reading => self.pause(),
            ReadingState::Paused => self.resume(),
            _ => {}
        }
        self.state() == ReadingState::Paused
    }

    /// Move an active session to `Stopping` and cancel the signal.
    ///
    /// Cancelling also wakes a worker blocked on the pause gate.
    pub(crate) fn begin_stop(&self) {
        let mut progress = self.lock();
        let was_active = progress.state.is_active() && progress.state != ReadingState::Stopping;
        if was_active {
            progress.state = ReadingState::Stopping;
        }
        self.signal.cancel();
        drop(progress);
        if was_active {
            tracing::info!(session = self.id, "Stopping reading");
            self.emit_state(ReadingState::Stopping);
        }
    }

    /// Give up on a worker that did not exit in time.
    ///
    /// The worker keeps its own reference and will finish this session
    /// whenever its backend call returns; nobody observes it after that.
    pub(crate) fn abandon(&self) {
        self.signal.cancel();
        let released = self.artifacts.release_all();
        tracing::warn!(
            session = self.id,
            released,
            "Reading worker did not stop in time, abandoning it"
        );
    }

    pub(crate) fn release_artifacts(&self) -> usize {
        self.artifacts.release_all()
    }

    /// Record a terminal outcome and notify listeners.
    pub(crate) fn finish(&self, outcome: &Outcome) {
        let cancelled = self.signal.is_cancelled();
        let mut progress = self.lock();

        let event = match outcome {
            Outcome::Completed => {
                progress.state = ReadingState::Idle;
                progress.current_index = 0;
                tracing::info!(session = self.id, "Reading finished");
                ReadingEvent::Finished { session: self.id }
            }
            Outcome::Failed(err) if !cancelled => self.record_failure(&mut progress, err),
            // A backend error after a stop request is part of stopping.
            Outcome::Cancelled | Outcome::Failed(_) => {
                progress.state = ReadingState::Idle;
                progress.current_index = 0;
                tracing::info!(session = self.id, "Reading stopped");
                ReadingEvent::Stopped { session: self.id }
            }
        };

        let state = progress.state;
        drop(progress);
        self.events.emit(event);
        self.emit_state(state);
    }

    /// Move to `Error` without a worker, e.g. when the worker never started.
    pub(crate) fn fail(&self, err: &ReaderError) {
        let mut progress = self.lock();
        let event = self.record_failure(&mut progress, err);
        drop(progress);
        self.events.emit(event);
        self.emit_state(ReadingState::Error);
    }

    fn record_failure(&self, progress: &mut Progress, err: &ReaderError) -> ReadingEvent {
        let message = err.to_string();
        tracing::error!(session = self.id, error = %err, "Reading failed");
        progress.state = ReadingState::Error;
        progress.error = Some(message.clone());
        ReadingEvent::Failed {
            session: self.id,
            message,
        }
    }

    // ── Worker loop ────────────────────────────────────────────────

    fn read_sentences(
        &self,
        synthesis: &dyn SynthesisBackend,
        playback: &dyn PlaybackBackend,
    ) -> Outcome {
        for sentence in &self.sentences {
            if !self.signal.wait_while_paused() {
                return Outcome::Cancelled;
            }
            self.enter_sentence(sentence);

            let artifact = match synthesis.synthesize(&sentence.text, &self.settings) {
                Ok(artifact) => artifact,
                Err(source) => {
                    return Outcome::Failed(ReaderError::Synthesis {
                        index: sentence.index,
                        source,
                    });
                }
            };
            self.artifacts.track(artifact.clone());

            if self.signal.is_cancelled() {
                self.artifacts.untrack(&artifact);
                return Outcome::Cancelled;
            }

            let played = playback.play(&artifact, &self.signal);
            self.artifacts.untrack(&artifact);
            if let Err(source) = played {
                return Outcome::Failed(ReaderError::Playback {
                    index: sentence.index,
                    source,
                });
            }
        }

        if self.signal.is_cancelled() {
            Outcome::Cancelled
        } else {
            Outcome::Completed
        }
    }

    fn enter_sentence(&self, sentence: &Sentence) {
        self.lock().current_index = sentence.index;
        tracing::debug!(
            session = self.id,
            index = sentence.index,
            total = self.total(),
            "Reading sentence"
        );
        self.events.emit(ReadingEvent::SentenceStarted {
            session: self.id,
            index: sentence.index,
            total: self.total(),
            text: sentence.text.clone(),
        });
    }

    fn emit_state(&self, state: ReadingState) {
        self.events.emit(ReadingEvent::StateChanged {
            session: self.id,
            state,
        });
    }

    fn lock(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs on every exit of the worker, including unwinding out of a backend.
struct FinishGuard {
    session: Arc<ReadingSession>,
    outcome: Option<Outcome>,
    done: mpsc::Sender<()>,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        let outcome = self
            .outcome
            .take()
            .unwrap_or_else(|| Outcome::Failed(ReaderError::WorkerPanicked));
        self.session.release_artifacts();
        self.session.finish(&outcome);
        let _ = self.done.send(());
    }
}

/// Body of the session worker thread.
pub(crate) fn run_worker(
    session: Arc<ReadingSession>,
    synthesis: Arc<dyn SynthesisBackend>,
    playback: Arc<dyn PlaybackBackend>,
    done: mpsc::Sender<()>,
) {
    let mut guard = FinishGuard {
        session,
        outcome: None,
        done,
    };
    let outcome = guard
        .session
        .read_sentences(synthesis.as_ref(), playback.as_ref());
    guard.outcome = Some(outcome);
}
