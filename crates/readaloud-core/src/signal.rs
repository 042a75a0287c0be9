//! Playback signal: pause and cancellation shared between controller and worker.
//!
//! The controller flips the flags; the session worker and the playback backend
//! observe them. Unlike a bare atomic flag, waiters block on a condition variable
//! and are woken as soon as either flag changes, so pausing never busy-waits and
//! a stop reaches a paused worker immediately.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Snapshot of the signal flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalState {
    pub paused: bool,
    pub cancelled: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<SignalState>,
    changed: Condvar,
}

/// Clone-shared pause/cancel flags with blocking waits.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSignal {
    shared: Arc<Shared>,
}

impl PlaybackSignal {
    /// Create a signal that is neither paused nor cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a pause. No effect once cancelled.
    pub fn pause(&self) {
        self.update(|state| {
            if !state.cancelled {
                state.paused = true;
            }
        });
    }

    /// Clear a pause request.
    pub fn resume(&self) {
        self.update(|state| state.paused = false);
    }

    /// Cancel. Also clears any pause so paused waiters wake up and exit.
    pub fn cancel(&self) {
        self.update(|state| {
            state.cancelled = true;
            state.paused = false;
        });
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    #[must_use]
    pub fn snapshot(&self) -> SignalState {
        *self.lock()
    }

    /// Block while paused.
    ///
    /// Returns `true` if the caller may proceed, `false` if the signal was cancelled.
    pub fn wait_while_paused(&self) -> bool {
        let guard = self.lock();
        let guard = self
            .shared
            .changed
            .wait_while(guard, |state| state.paused && !state.cancelled)
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        !guard.cancelled
    }

    /// Block until the flags differ from `seen` or `timeout` elapses.
    ///
    /// Returns the current flags either way. Playback backends use this to
    /// poll their device and the signal in one loop.
    pub fn wait_change(&self, seen: SignalState, timeout: Duration) -> SignalState {
        let guard = self.lock();
        let (guard, _) = self
            .shared
            .changed
            .wait_timeout_while(guard, timeout, |state| *state == seen)
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard
    }

    fn update(&self, apply: impl FnOnce(&mut SignalState)) {
        let mut guard = self.lock();
        let before = *guard;
        apply(&mut guard);
        if *guard != before {
            tracing::debug!(
                paused = guard.paused,
                cancelled = guard.cancelled,
                "Playback signal changed"
            );
            self.shared.changed.notify_all();
        }
    }

    fn lock(&self) -> MutexGuard<'_, SignalState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn signal_default_is_running() {
        let signal = PlaybackSignal::new();
        assert!(!signal.is_paused());
        assert!(!signal.is_cancelled());
    }

    #[test]
    fn signal_pause_resume() {
        let signal = PlaybackSignal::new();

        signal.pause();
        assert!(signal.is_paused());

        signal.resume();
        assert!(!signal.is_paused());
    }

    #[test]
    fn signal_cancel_clears_pause_and_is_sticky() {
        let signal = PlaybackSignal::new();
        signal.pause();
        signal.cancel();
        assert_eq!(
            signal.snapshot(),
            SignalState {
                paused: false,
                cancelled: true
            }
        );

        signal.pause();
        assert!(!signal.is_paused());
    }

    #[test]
    fn signal_clone_shares_state() {
        let signal1 = PlaybackSignal::new();
        let signal2 = signal1.clone();

        signal1.pause();
        assert!(signal2.is_paused());

        signal2.cancel();
        assert!(signal1.is_cancelled());
    }

    #[test]
    fn wait_while_paused_returns_immediately_when_running() {
        let signal = PlaybackSignal::new();
        assert!(signal.wait_while_paused());
    }

    #[test]
    fn wait_while_paused_wakes_on_resume() {
        let signal = PlaybackSignal::new();
        signal.pause();

        let waiter = {
            let signal = signal.clone();
            thread::spawn(move || signal.wait_while_paused())
        };

        thread::sleep(Duration::from_millis(20));
        signal.resume();
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn wait_while_paused_wakes_on_cancel() {
        let signal = PlaybackSignal::new();
        signal.pause();

        let waiter = {
            let signal = signal.clone();
            thread::spawn(move || signal.wait_while_paused())
        };

        thread::sleep(Duration::from_millis(20));
        signal.cancel();
        assert!(!waiter.join().unwrap());
    }

    #[test]
    fn wait_change_times_out_without_change() {
        let signal = PlaybackSignal::new();
        let start = Instant::now();
        let state = signal.wait_change(signal.snapshot(), Duration::from_millis(30));
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert_eq!(state, SignalState::default());
    }

    #[test]
    fn wait_change_returns_new_state() {
        let signal = PlaybackSignal::new();
        let seen = signal.snapshot();

        let waiter = {
            let signal = signal.clone();
            thread::spawn(move || signal.wait_change(seen, Duration::from_secs(5)))
        };

        thread::sleep(Duration::from_millis(20));
        signal.pause();
        let state = waiter.join().unwrap();
        assert!(state.paused);
    }
}
