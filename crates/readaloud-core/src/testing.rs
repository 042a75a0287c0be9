//! Scripted backends for exercising the controller without audio or network.
//!
//! Available to this crate's tests and, with the `test-utils` feature, to
//! integration tests and downstream crates.
//!
//! [`ScriptedSynthesis`] writes the sentence text into a real file so artifact
//! cleanup can be checked on disk. [`ScriptedPlayback`] "plays" a file by
//! waiting for a fixed duration while honouring the [`PlaybackSignal`] exactly
//! like a device-backed player would.

#![allow(clippy::missing_panics_doc)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::ports::{Artifact, BackendError, PlaybackBackend, SynthesisBackend};
use crate::settings::ReadingSettings;
use crate::signal::PlaybackSignal;

/// One recorded synthesis request.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisCall {
    pub text: String,
    pub settings: ReadingSettings,
}

/// Synthesis backend that writes each sentence into `<dir>/artifact-<n>.audio`.
#[derive(Debug)]
pub struct ScriptedSynthesis {
    dir: PathBuf,
    fail_at: Option<usize>,
    delay: Duration,
    calls: Mutex<Vec<SynthesisCall>>,
}

impl ScriptedSynthesis {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            fail_at: None,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail the call with this zero-based number.
    #[must_use]
    pub const fn failing_at(mut self, call: usize) -> Self {
        self.fail_at = Some(call);
        self
    }

    /// Sleep this long inside every call, ignoring cancellation like a slow
    /// network request would.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<SynthesisCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl SynthesisBackend for ScriptedSynthesis {
    fn synthesize(&self, text: &str, settings: &ReadingSettings) -> Result<Artifact, BackendError> {
        let call = {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            calls.push(SynthesisCall {
                text: text.to_string(),
                settings: settings.clone(),
            });
            calls.len() - 1
        };

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        if self.fail_at == Some(call) {
            return Err(BackendError::Request(format!("scripted failure at call {call}")));
        }

        let path = self.dir.join(format!("artifact-{call}.audio"));
        std::fs::write(&path, text)?;
        Ok(Artifact::new(path))
    }
}

/// Playback backend that simulates a clip of fixed length per artifact.
#[derive(Debug)]
pub struct ScriptedPlayback {
    duration: Duration,
    poll: Duration,
    fail_at: Option<usize>,
    played: Mutex<Vec<String>>,
    started: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    interrupted: AtomicUsize,
}

impl ScriptedPlayback {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            poll: Duration::from_millis(10),
            fail_at: None,
            played: Mutex::new(Vec::new()),
            started: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            interrupted: AtomicUsize::new(0),
        }
    }

    /// Fail the playback with this zero-based number.
    #[must_use]
    pub const fn failing_at(mut self, call: usize) -> Self {
        self.fail_at = Some(call);
        self
    }

    /// Texts of artifacts played to the end, in order.
    pub fn played(&self) -> Vec<String> {
        self.played.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Playbacks begun, including interrupted ones.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Largest number of simultaneous `play` calls seen.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Playbacks cut short by cancellation.
    pub fn interrupted(&self) -> usize {
        self.interrupted.load(Ordering::SeqCst)
    }
}

impl PlaybackBackend for ScriptedPlayback {
    fn play(&self, artifact: &Artifact, signal: &PlaybackSignal) -> Result<(), BackendError> {
        let call = self.started.fetch_add(1, Ordering::SeqCst);
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
        let result = self.simulate(call, artifact, signal);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl ScriptedPlayback {
    fn simulate(
        &self,
        call: usize,
        artifact: &Artifact,
        signal: &PlaybackSignal,
    ) -> Result<(), BackendError> {
        let text = std::fs::read_to_string(artifact.path())?;
        if self.fail_at == Some(call) {
            return Err(BackendError::Device(format!("scripted failure at call {call}")));
        }

        // Remaining clip time only runs down while not paused.
        let mut remaining = self.duration;
        loop {
            let state = signal.snapshot();
            if state.cancelled {
                self.interrupted.fetch_add(1, Ordering::SeqCst);
                return Ok(());
            }
            if remaining.is_zero() {
                break;
            }
            if state.paused {
                signal.wait_change(state, self.poll);
                continue;
            }
            let slice = remaining.min(self.poll);
            let started = Instant::now();
            signal.wait_change(state, slice);
            remaining = remaining.saturating_sub(started.elapsed());
        }

        self.played
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text);
        Ok(())
    }
}

/// Poll `check` every 5 ms until it returns `true` or `timeout` elapses.
pub fn wait_for(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// Number of entries in `dir`.
pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map_or(0, Iterator::count)
}
