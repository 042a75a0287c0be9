//! Offline synthesis through the `espeak-ng` command.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use readaloud_core::{Artifact, BackendError, ReadingSettings, SynthesisBackend};

use crate::artifact_dir::ArtifactDir;

/// Program looked up on `PATH` by default.
pub const DEFAULT_PROGRAM: &str = "espeak-ng";

/// espeak-ng's own default rate, used for speed 1.0.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// Synthesis by running `espeak-ng` once per sentence and writing a WAV file.
#[derive(Debug, Clone)]
pub struct EspeakSynthesis {
    program: PathBuf,
    artifacts: ArtifactDir,
}

impl EspeakSynthesis {
    pub fn new(artifacts: ArtifactDir) -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            artifacts,
        }
    }

    /// Use a specific executable instead of `espeak-ng` from `PATH`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    fn run(
        &self,
        artifact: &Artifact,
        text: &str,
        settings: &ReadingSettings,
    ) -> Result<(), BackendError> {
        let mut child = Command::new(&self.program)
            .arg("-v")
            .arg(&settings.language)
            .arg("-s")
            .arg(words_per_minute(settings.speed).to_string())
            .arg("-w")
            .arg(artifact.path())
            .arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => BackendError::Unavailable(format!(
                    "{} not found; install espeak-ng or use another backend",
                    self.program.display()
                )),
                _ => BackendError::Io(e),
            })?;

        let mut input_truncated = false;
        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(text.as_bytes()) {
                Ok(()) => {}
                // The program exited without reading everything; its exit
                // status and stderr say why.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => input_truncated = true,
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(BackendError::Io(e));
                }
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::Request(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }
        if input_truncated {
            return Err(BackendError::Request(format!(
                "{} exited before reading the whole sentence",
                self.program.display()
            )));
        }
        Ok(())
    }
}

impl SynthesisBackend for EspeakSynthesis {
    fn synthesize(&self, text: &str, settings: &ReadingSettings) -> Result<Artifact, BackendError> {
        let artifact = self.artifacts.allocate("wav")?;
        if let Err(e) = self.run(&artifact, text, settings) {
            if let Err(discard_err) = artifact.discard() {
                tracing::warn!(
                    path = %artifact.path().display(),
                    error = %discard_err,
                    "Failed to remove partial espeak output"
                );
            }
            return Err(e);
        }
        tracing::debug!(language = %settings.language, "Synthesized sentence with espeak-ng");
        Ok(artifact)
    }
}

/// Map a speed multiplier to espeak-ng's `-s` rate.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn words_per_minute(speed: f32) -> u32 {
    (BASE_WORDS_PER_MINUTE * speed).round().clamp(80.0, 450.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_maps_to_words_per_minute() {
        assert_eq!(words_per_minute(1.0), 175);
        assert_eq!(words_per_minute(0.5), 88);
        assert_eq!(words_per_minute(2.0), 350);
        assert_eq!(words_per_minute(0.1), 80);
    }

    /// Script that rejects its arguments without reading stdin.
    #[cfg(unix)]
    fn failing_program(dir: &std::path::Path) -> PathBuf {
        use std::os::unix::fs::OpenOptionsExt;

        let path = dir.join("fake-espeak");
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o755)
            .open(&path)
            .unwrap();
        file.write_all(b"#!/bin/sh\necho 'voice xx not found' >&2\nexit 1\n")
            .unwrap();
        drop(file);
        path
    }

    #[cfg(unix)]
    #[test]
    fn early_exit_reports_stderr_not_broken_pipe() {
        let bin = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let espeak = EspeakSynthesis::new(ArtifactDir::new(out.path()).unwrap())
            .with_program(failing_program(bin.path()));

        // Far larger than a pipe buffer, so the write outlives the program.
        let text = "Uma frase muito longa. ".repeat(40_000);
        let err = espeak
            .synthesize(&text, &ReadingSettings::new("xx", 1.0))
            .unwrap_err();

        assert!(matches!(err, BackendError::Request(_)), "{err:?}");
        assert!(err.to_string().contains("voice xx not found"), "{err}");
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_program_is_unavailable_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let espeak = EspeakSynthesis::new(ArtifactDir::new(dir.path()).unwrap())
            .with_program(dir.path().join("no-such-espeak"));

        let err = espeak
            .synthesize("Hello there.", &ReadingSettings::default())
            .unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
