//! Reading controller: the public start/pause/resume/stop/status API.
//!
//! The controller owns at most one live [`ReadingSession`] and the thread that
//! works it. Two locks keep the API responsive:
//!
//! - the *worker* lock serializes `start_reading` and `stop` and is held while
//!   waiting for a worker to exit;
//! - the *current* lock guards the session reference used by `status`, `pause`
//!   and `resume`, and is only ever held for a pointer copy.
//!
//! Polling `status` therefore never waits behind a stop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::ReaderConfig;
use crate::error::ReaderError;
use crate::events::{EventSink, ReadingEvent};
use crate::ports::{PlaybackBackend, SynthesisBackend};
use crate::session::{self, ReadingSession};
use crate::settings::ReadingSettings;
use crate::status::SessionStatus;
use crate::text::segment;

/// Result of a successful [`ReadingController::start_reading`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A session was started.
    Started { session: u64, total: usize },

    /// The text contained no readable sentences; nothing was started.
    NothingToRead,
}

/// A running worker thread and the channel it reports completion on.
struct Worker {
    session: Arc<ReadingSession>,
    handle: thread::JoinHandle<()>,
    done: mpsc::Receiver<()>,
}

/// Drives reading sessions over injected synthesis and playback backends.
pub struct ReadingController {
    synthesis: Arc<dyn SynthesisBackend>,
    playback: Arc<dyn PlaybackBackend>,
    stop_timeout: Duration,
    events: EventSink,
    next_session: AtomicU64,
    worker: Mutex<Option<Worker>>,
    current: Mutex<Option<Arc<ReadingSession>>>,
}

impl ReadingController {
    /// Create a controller.
    ///
    /// Returns the controller and a receiver for [`ReadingEvent`]s. Dropping
    /// the receiver is fine; events are then discarded.
    pub fn new(
        synthesis: Arc<dyn SynthesisBackend>,
        playback: Arc<dyn PlaybackBackend>,
        config: &ReaderConfig,
    ) -> (Self, UnboundedReceiver<ReadingEvent>) {
        let (events, rx) = EventSink::channel();
        let controller = Self {
            synthesis,
            playback,
            stop_timeout: config.stop_timeout(),
            events,
            next_session: AtomicU64::new(1),
            worker: Mutex::new(None),
            current: Mutex::new(None),
        };
        (controller, rx)
    }

    /// Start reading `text` with `settings`.
    ///
    /// Any session already running is stopped first. Settings are validated
    /// before that happens, so invalid settings never interrupt a session.
    /// If the stop times out the old worker is abandoned and the new session
    /// starts anyway.
    pub fn start_reading(
        &self,
        text: &str,
        settings: ReadingSettings,
    ) -> Result<StartOutcome, ReaderError> {
        settings.validate()?;

        let mut worker = lock(&self.worker);
        if let Err(e) = self.stop_locked(&mut worker) {
            tracing::warn!(error = %e, "Previous session abandoned before restart");
        }

        let sentences = segment(text);
        if sentences.is_empty() {
            tracing::info!("No readable sentences in text, nothing to start");
            return Ok(StartOutcome::NothingToRead);
        }

        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        let session = Arc::new(ReadingSession::new(
            id,
            sentences,
            settings,
            self.events.clone(),
        ));
        let total = session.total();

        *lock(&self.current) = Some(Arc::clone(&session));
        session.announce();

        let (done_tx, done_rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name(format!("readaloud-session-{id}"))
            .spawn({
                let session = Arc::clone(&session);
                let synthesis = Arc::clone(&self.synthesis);
                let playback = Arc::clone(&self.playback);
                move || session::run_worker(session, synthesis, playback, done_tx)
            });

        match spawned {
            Ok(handle) => {
                *worker = Some(Worker {
                    session,
                    handle,
                    done: done_rx,
                });
                Ok(StartOutcome::Started { session: id, total })
            }
            Err(source) => {
                let err = ReaderError::Spawn(source);
                session.fail(&err);
                Err(err)
            }
        }
    }

    /// Pause the current session mid-sentence. No-op unless reading.
    pub fn pause(&self) {
        if let Some(session) = self.current_session() {
            session.pause();
        }
    }

    /// Resume a paused session from where it stopped. No-op unless paused.
    pub fn resume(&self) {
        if let Some(session) = self.current_session() {
            session.resume();
        }
    }

    /// Pause if reading, resume if paused. Returns whether reading is now paused.
    pub fn toggle_pause(&self) -> bool {
        self.current_session()
            .is_some_and(|session| session.toggle_pause())
    }

    /// Stop the current session and wait for its worker.
    ///
    /// Waits at most the configured stop timeout; a worker still stuck in a
    /// backend after that is abandoned and [`ReaderError::StopTimeout`] is
    /// returned. Outstanding artifacts are released and status reads idle in
    /// both cases. Stopping when nothing runs is a no-op.
    pub fn stop(&self) -> Result<(), ReaderError> {
        let mut worker = lock(&self.worker);
        self.stop_locked(&mut worker)
    }

    /// Snapshot of the current session, or idle when there is none.
    pub fn status(&self) -> SessionStatus {
        self.current_session()
            .map_or_else(SessionStatus::idle, |session| session.status())
    }

    pub fn is_reading(&self) -> bool {
        self.status().is_reading
    }

    fn stop_locked(&self, worker: &mut Option<Worker>) -> Result<(), ReaderError> {
        let Some(Worker {
            session,
            handle,
            done,
        }) = worker.take()
        else {
            *lock(&self.current) = None;
            return Ok(());
        };

        session.begin_stop();

        let result = match done.recv_timeout(self.stop_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if handle.join().is_err() {
                    tracing::warn!(session = session.id(), "Reading worker panicked");
                }
                Ok(())
            }
            Err(RecvTimeoutError::Timeout) => {
                session.abandon();
                Err(ReaderError::StopTimeout {
                    waited: self.stop_timeout,
                })
            }
        };

        session.release_artifacts();
        *lock(&self.current) = None;
        result
    }

    fn current_session(&self) -> Option<Arc<ReadingSession>> {
        lock(&self.current).clone()
    }
}

impl Drop for ReadingController {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!(error = %e, "Reading worker still running at shutdown");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{Artifact, BackendError, MockPlaybackBackend, MockSynthesisBackend};
    use crate::status::ReadingState;
    use crate::testing::wait_for;

    fn controller(
        synthesis: MockSynthesisBackend,
        playback: MockPlaybackBackend,
    ) -> ReadingController {
        let (controller, _rx) = ReadingController::new(
            Arc::new(synthesis),
            Arc::new(playback),
            &ReaderConfig::default(),
        );
        controller
    }

    #[test]
    fn synthesis_failure_never_reaches_playback() {
        let mut synthesis = MockSynthesisBackend::new();
        synthesis
            .expect_synthesize()
            .times(1)
            .returning(|_, _| Err(BackendError::Request("HTTP 500".into())));
        let mut playback = MockPlaybackBackend::new();
        playback.expect_play().never();

        let controller = controller(synthesis, playback);
        let outcome = controller
            .start_reading("First sentence. Second sentence.", ReadingSettings::default())
            .unwrap();
        assert_eq!(
            outcome,
            StartOutcome::Started {
                session: 1,
                total: 2
            }
        );

        assert!(wait_for(Duration::from_secs(2), || {
            controller.status().state == ReadingState::Error
        }));
        let status = controller.status();
        assert_eq!(status.current_index, 0);
        assert!(status.error.unwrap().contains("HTTP 500"));
    }

    #[test]
    fn each_sentence_is_synthesized_and_played_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();

        let mut synthesis = MockSynthesisBackend::new();
        synthesis.expect_synthesize().times(3).returning(move |text, _| {
            let file = path.join(format!("{}.audio", text.len()));
            std::fs::write(&file, text)?;
            Ok(Artifact::new(file))
        });
        let mut playback = MockPlaybackBackend::new();
        playback.expect_play().times(3).returning(|_, _| Ok(()));

        let controller = controller(synthesis, playback);
        controller
            .start_reading(
                "One sentence. Two is longer. Three is longest.",
                ReadingSettings::default(),
            )
            .unwrap();

        let finished = SessionStatus {
            total: 3,
            ..SessionStatus::idle()
        };
        assert!(wait_for(Duration::from_secs(2), || controller.status() == finished));
        controller.stop().unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn invalid_settings_leave_running_session_alone() {
        let mut synthesis = MockSynthesisBackend::new();
        synthesis.expect_synthesize().never();
        let playback = MockPlaybackBackend::new();
        let controller = controller(synthesis, playback);

        let err = controller
            .start_reading("Some text here.", ReadingSettings::new("en", 9.0))
            .unwrap_err();
        assert!(matches!(err, ReaderError::InvalidSettings(_)));
        assert_eq!(controller.status(), SessionStatus::idle());
    }

    #[test]
    fn session_ids_increase() {
        let mut synthesis = MockSynthesisBackend::new();
        synthesis
            .expect_synthesize()
            .returning(|_, _| Err(BackendError::Unavailable("offline".into())));
        let controller = controller(synthesis, MockPlaybackBackend::new());

        let first = controller.start_reading("Read this.", ReadingSettings::default());
        let second = controller.start_reading("Read that.", ReadingSettings::default());
        assert_eq!(
            first.unwrap(),
            StartOutcome::Started {
                session: 1,
                total: 1
            }
        );
        assert_eq!(
            second.unwrap(),
            StartOutcome::Started {
                session: 2,
                total: 1
            }
        );
    }
}
