//! Session status snapshots for UI polling.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Reading state machine ──────────────────────────────────────────

/// Lifecycle state of a reading session.
///
/// ```text
///   Idle → Reading ⇄ Paused
///            │         │
///            ├─────────┴→ Stopping → Idle
///            ├→ Idle            (last sentence played)
///            └→ Error           (backend failure)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingState {
    /// Nothing is being read.
    #[default]
    Idle,

    /// Sentences are being synthesized and played.
    Reading,

    /// Reading is suspended mid-sentence.
    Paused,

    /// A stop was requested and the worker is winding down.
    Stopping,

    /// The session ended because a backend failed.
    Error,
}

impl ReadingState {
    /// Whether a session in this state still owns a worker.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Reading | Self::Paused | Self::Stopping)
    }
}

impl fmt::Display for ReadingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Reading => "reading",
            Self::Paused => "paused",
            Self::Stopping => "stopping",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

// ── Status snapshot ────────────────────────────────────────────────

/// Consistent snapshot of the controller, taken under a single lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// A session is running (reading, paused or stopping).
    pub is_reading: bool,

    /// The running session is paused. Implies `is_reading`.
    pub is_paused: bool,

    /// Zero-based index of the sentence being read.
    pub current_index: usize,

    /// Number of sentences in the session.
    pub total: usize,

    pub state: ReadingState,

    /// Failure message when `state` is [`ReadingState::Error`].
    pub error: Option<String>,
}

impl SessionStatus {
    /// Status when no session exists.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            is_reading: false,
            is_paused: false,
            current_index: 0,
            total: 0,
            state: ReadingState::Idle,
            error: None,
        }
    }

    /// Completed share of the session in percent, counting the current sentence.
    #[must_use]
    pub fn progress_percent(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        ((self.current_index + 1) * 100 / self.total).min(100)
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::idle()
    }
}

/// Human readable status line, as shown in a reader's status bar.
impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let position = self.current_index + 1;
        match self.state {
            ReadingState::Paused => write!(f, "Paused ({position}/{})", self.total),
            ReadingState::Reading => write!(
                f,
                "Reading... ({position}/{}) - {}%",
                self.total,
                self.progress_percent()
            ),
            ReadingState::Stopping => f.write_str("Stopping..."),
            ReadingState::Error => {
                write!(f, "Error: {}", self.error.as_deref().unwrap_or("unknown"))
            }
            ReadingState::Idle => f.write_str("Ready"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(state: ReadingState, current_index: usize, total: usize) -> SessionStatus {
        SessionStatus {
            is_reading: state.is_active(),
            is_paused: state == ReadingState::Paused,
            current_index,
            total,
            state,
            error: None,
        }
    }

    #[test]
    fn test_idle_status() {
        let idle = SessionStatus::idle();
        assert!(!idle.is_reading);
        assert!(!idle.is_paused);
        assert_eq!(idle.total, 0);
        assert_eq!(idle.to_string(), "Ready");
    }

    #[test]
    fn test_status_lines() {
        assert_eq!(
            status(ReadingState::Reading, 1, 4).to_string(),
            "Reading... (2/4) - 50%"
        );
        assert_eq!(status(ReadingState::Paused, 2, 3).to_string(), "Paused (3/3)");

        let mut failed = status(ReadingState::Error, 2, 5);
        failed.error = Some("network down".into());
        assert_eq!(failed.to_string(), "Error: network down");
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(status(ReadingState::Reading, 0, 3).progress_percent(), 33);
        assert_eq!(status(ReadingState::Reading, 2, 3).progress_percent(), 100);
        assert_eq!(SessionStatus::idle().progress_percent(), 0);
    }

    #[test]
    fn test_active_states() {
        assert!(ReadingState::Reading.is_active());
        assert!(ReadingState::Paused.is_active());
        assert!(ReadingState::Stopping.is_active());
        assert!(!ReadingState::Idle.is_active());
        assert!(!ReadingState::Error.is_active());
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&ReadingState::Stopping).unwrap();
        assert_eq!(json, r#""stopping""#);
    }
}
