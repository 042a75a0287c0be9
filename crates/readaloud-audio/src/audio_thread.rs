//! Dedicated audio output thread, isolating `!Send` rodio resources.
//!
//! `rodio::OutputStream` is `!Send` on some platforms, so the stream and its
//! sink live on one OS thread for their whole lifetime. [`AudioThreadHandle`]
//! is the `Send + Sync` proxy that playback holds; every operation is an
//! [`AudioCommand`] sent over a channel.
//!
//! Each `play` returns a clip id. Control commands carry that id and are
//! ignored when a newer clip has replaced it, so a late command from an
//! abandoned reader cannot touch the current clip.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use readaloud_core::BackendError;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

/// Identifies one clip started with [`AudioThreadHandle::play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipId(u64);

// ── Commands ───────────────────────────────────────────────────────

enum AudioCommand {
    /// Decode a file and start playing it, replacing any current clip.
    Play {
        path: PathBuf,
        reply: mpsc::Sender<Result<ClipId, BackendError>>,
    },

    /// Suspend output, keeping the position.
    Pause(ClipId),

    /// Continue output from the paused position.
    Resume(ClipId),

    /// Drop the clip immediately.
    Stop(ClipId),

    /// Whether the clip has played to the end (or was replaced).
    IsFinished {
        clip: ClipId,
        reply: mpsc::Sender<bool>,
    },

    Shutdown,
}

// ── Handle (Send + Sync proxy) ─────────────────────────────────────

/// `Send + Sync` handle to the audio output thread.
pub struct AudioThreadHandle {
    cmd_tx: mpsc::Sender<AudioCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioThreadHandle {
    /// Spawn the audio thread and open the default output device on it.
    ///
    /// Device errors are reported back through a one-shot init channel.
    pub fn spawn() -> Result<Self, BackendError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), BackendError>>();

        let thread = thread::Builder::new()
            .name("readaloud-audio".into())
            .spawn(move || Self::run(&cmd_rx, &init_tx))?;

        init_rx.recv().map_err(|_| audio_thread_died())??;

        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    /// Start playing `path`. Returns once decoding has begun.
    pub fn play(&self, path: PathBuf) -> Result<ClipId, BackendError> {
        let (tx, rx) = mpsc::channel();
        self.cmd_tx
            .send(AudioCommand::Play { path, reply: tx })
            .map_err(|_| audio_thread_died())?;
        rx.recv().map_err(|_| audio_thread_died())?
    }

    pub fn pause(&self, clip: ClipId) {
        let _ = self.cmd_tx.send(AudioCommand::Pause(clip));
    }

    pub fn resume(&self, clip: ClipId) {
        let _ = self.cmd_tx.send(AudioCommand::Resume(clip));
    }

    /// Stop the clip (fire-and-forget).
    pub fn stop(&self, clip: ClipId) {
        let _ = self.cmd_tx.send(AudioCommand::Stop(clip));
    }

    pub fn is_finished(&self, clip: ClipId) -> Result<bool, BackendError> {
        let (tx, rx) = mpsc::channel();
        self.cmd_tx
            .send(AudioCommand::IsFinished { clip, reply: tx })
            .map_err(|_| audio_thread_died())?;
        rx.recv().map_err(|_| audio_thread_died())
    }

    // ── Audio thread event loop ────────────────────────────────────

    fn run(
        cmd_rx: &mpsc::Receiver<AudioCommand>,
        init_tx: &mpsc::Sender<Result<(), BackendError>>,
    ) {
        let (_stream, stream_handle) = match OutputStream::try_default() {
            Ok(output) => output,
            Err(e) => {
                let _ = init_tx.send(Err(BackendError::Device(e.to_string())));
                return;
            }
        };

        if init_tx.send(Ok(())).is_err() {
            return;
        }
        tracing::info!("Audio output initialized on default device");

        let mut next_clip = 0_u64;
        let mut current: Option<(ClipId, Sink)> = None;

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AudioCommand::Play { path, reply } => {
                    if let Some((_, sink)) = current.take() {
                        sink.stop();
                    }
                    let result = start_clip(&stream_handle, path).map(|sink| {
                        next_clip += 1;
                        let clip = ClipId(next_clip);
                        current = Some((clip, sink));
                        clip
                    });
                    let _ = reply.send(result);
                }

                AudioCommand::Pause(clip) => {
                    if let Some((_, sink)) = current.as_ref().filter(|(id, _)| *id == clip) {
                        sink.pause();
                    }
                }

                AudioCommand::Resume(clip) => {
                    if let Some((_, sink)) = current.as_ref().filter(|(id, _)| *id == clip) {
                        sink.play();
                    }
                }

                AudioCommand::Stop(clip) => {
                    if current.as_ref().is_some_and(|(id, _)| *id == clip) {
                        if let Some((_, sink)) = current.take() {
                            sink.stop();
                        }
                    }
                }

                AudioCommand::IsFinished { clip, reply } => {
                    let finished = current
                        .as_ref()
                        .filter(|(id, _)| *id == clip)
                        .is_none_or(|(_, sink)| sink.empty());
                    let _ = reply.send(finished);
                }

                AudioCommand::Shutdown => break,
            }
        }

        // The sink and the stream are dropped here, on the audio thread.
        tracing::debug!("Audio thread shutting down");
    }
}

impl Drop for AudioThreadHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn start_clip(stream_handle: &OutputStreamHandle, path: PathBuf) -> Result<Sink, BackendError> {
    let file = File::open(&path)?;
    let source = Decoder::new(BufReader::new(file))
        .map_err(|e| BackendError::Decode(format!("{}: {e}", path.display())))?;
    let sink = Sink::try_new(stream_handle).map_err(|e| BackendError::Device(e.to_string()))?;
    sink.append(source);
    tracing::debug!(path = %path.display(), "Clip started");
    Ok(sink)
}

fn audio_thread_died() -> BackendError {
    BackendError::Device("audio thread stopped".to_string())
}
