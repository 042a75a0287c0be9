//! Events emitted by reading sessions.
//!
//! Status polling is the primary interface; events are a push complement for
//! front-ends that want to highlight the sentence being read or react to the
//! end of a session without polling.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::status::ReadingState;

/// Something that happened in a reading session.
///
/// Every variant carries the id of the session that emitted it, so events
/// from a replaced session can be told apart from the current one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReadingEvent {
    /// Session state changed.
    StateChanged { session: u64, state: ReadingState },

    /// A sentence is about to be synthesized and played.
    SentenceStarted {
        session: u64,
        index: usize,
        total: usize,
        text: String,
    },

    /// Every sentence was played.
    Finished { session: u64 },

    /// The session was stopped before the end.
    Stopped { session: u64 },

    /// The session ended because a backend failed.
    Failed { session: u64, message: String },
}

/// Sending half of the event channel.
///
/// Sends never fail from the session's point of view: a dropped receiver only
/// means nobody is listening.
#[derive(Debug, Clone)]
pub(crate) struct EventSink {
    tx: mpsc::UnboundedSender<ReadingEvent>,
}

impl EventSink {
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<ReadingEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub(crate) fn emit(&self, event: ReadingEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_after_receiver_dropped_is_silent() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.emit(ReadingEvent::Finished { session: 1 });
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(ReadingEvent::StateChanged {
            session: 3,
            state: ReadingState::Paused,
        })
        .unwrap();
        assert_eq!(json["type"], "state_changed");
        assert_eq!(json["state"], "paused");
    }
}
