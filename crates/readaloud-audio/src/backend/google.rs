//! Google Translate text-to-speech backend.
//!
//! Uses the public `translate_tts` endpoint that the translate web UI plays
//! audio from. The endpoint only accepts short inputs, so sentences are split
//! into chunks of at most [`MAX_CHUNK_CHARS`] characters at word boundaries.
//! Each chunk comes back as a standalone MP3 stream; MP3 frames can be
//! concatenated, so the chunks are joined into one artifact.

use std::time::Duration;

use readaloud_core::{Artifact, BackendError, ReadingSettings, SynthesisBackend};

use crate::artifact_dir::ArtifactDir;

/// Public endpoint used by the translate web UI.
pub const DEFAULT_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Longest input the endpoint accepts per request.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Speed parameter for the slow voice. The endpoint has no other speeds.
const SLOW_TTS_SPEED: &str = "0.3";
const NORMAL_TTS_SPEED: &str = "1";

const USER_AGENT: &str = concat!("readaloud/", env!("CARGO_PKG_VERSION"));

/// Synthesis through Google Translate.
///
/// The port is blocking, so the backend owns a small current-thread runtime
/// to drive the async HTTP client from the session worker thread.
pub struct GoogleTranslateTts {
    client: reqwest::Client,
    runtime: Option<tokio::runtime::Runtime>,
    endpoint: String,
    artifacts: ArtifactDir,
}

impl GoogleTranslateTts {
    pub fn new(artifacts: ArtifactDir, request_timeout: Duration) -> Result<Self, BackendError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let client = {
            let _guard = runtime.enter();
            reqwest::Client::builder()
                .timeout(request_timeout)
                .user_agent(USER_AGENT)
                .build()
                .map_err(|e| BackendError::Unavailable(format!("HTTP client: {e}")))?
        };

        Ok(Self {
            client,
            runtime: Some(runtime),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            artifacts,
        })
    }

    /// Send requests to `endpoint` instead of the public service.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn fetch_all(
        &self,
        chunks: &[String],
        settings: &ReadingSettings,
    ) -> Result<Vec<u8>, BackendError> {
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let bytes = self.fetch_chunk(chunk, idx, chunks.len(), settings).await?;
            audio.extend_from_slice(&bytes);
        }
        Ok(audio)
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        idx: usize,
        total: usize,
        settings: &ReadingSettings,
    ) -> Result<Vec<u8>, BackendError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&query_params(chunk, idx, total, settings))
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        tracing::trace!(idx, total, bytes = bytes.len(), "Fetched speech chunk");
        Ok(bytes.to_vec())
    }
}

impl SynthesisBackend for GoogleTranslateTts {
    fn synthesize(&self, text: &str, settings: &ReadingSettings) -> Result<Artifact, BackendError> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(BackendError::Request("No text to synthesize".to_string()));
        }

        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| BackendError::Unavailable("HTTP runtime shut down".to_string()))?;
        let audio = runtime.block_on(self.fetch_all(&chunks, settings))?;
        if audio.is_empty() {
            return Err(BackendError::Decode("Service returned no audio".to_string()));
        }

        tracing::debug!(
            chunks = chunks.len(),
            bytes = audio.len(),
            language = %settings.language,
            slow = settings.is_slow(),
            "Synthesized sentence"
        );
        self.artifacts.write("mp3", &audio)
    }
}

impl Drop for GoogleTranslateTts {
    fn drop(&mut self) {
        // The last reference may go away inside an async caller, where a
        // blocking runtime shutdown would panic.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Query string for one chunk request.
fn query_params(
    chunk: &str,
    idx: usize,
    total: usize,
    settings: &ReadingSettings,
) -> Vec<(&'static str, String)> {
    let speed = if settings.is_slow() {
        SLOW_TTS_SPEED
    } else {
        NORMAL_TTS_SPEED
    };
    vec![
        ("ie", "UTF-8".to_string()),
        ("q", chunk.to_string()),
        ("tl", settings.language.clone()),
        ("client", "tw-ob".to_string()),
        ("ttsspeed", speed.to_string()),
        ("total", total.to_string()),
        ("idx", idx.to_string()),
        ("textlen", chunk.chars().count().to_string()),
    ]
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Breaks at whitespace; a single word longer than `max_chars` is cut hard.
/// Runs of whitespace collapse to one space.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len > 0 && current_len + 1 + word_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if word_len > max_chars {
            let chars: Vec<char> = word.chars().collect();
            let mut pieces = chars.chunks(max_chars).peekable();
            while let Some(piece) = pieces.next() {
                let piece: String = piece.iter().collect();
                if pieces.peek().is_some() {
                    chunks.push(piece);
                } else {
                    current_len = piece.chars().count();
                    current = piece;
                }
            }
            continue;
        }

        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("  Hello   world. ", 100), vec!["Hello world."]);
        assert!(chunk_text("   ", 100).is_empty());
    }

    #[test]
    fn chunks_break_at_word_boundaries() {
        let text = "alpha beta gamma delta";
        assert_eq!(chunk_text(text, 11), vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn long_word_is_cut() {
        assert_eq!(
            chunk_text("ab abcdefghij xy", 4),
            vec!["ab", "abcd", "efgh", "ij", "xy"]
        );
        assert_eq!(chunk_text("abcdefghij k", 4), vec!["abcd", "efgh", "ij k"]);
    }

    #[test]
    fn chunks_respect_limit_in_characters() {
        let text = "ação ".repeat(60);
        let chunks = chunk_text(&text, MAX_CHUNK_CHARS);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= MAX_CHUNK_CHARS));
        assert_eq!(chunks.join(" "), text.trim_end());
    }

    #[test]
    fn query_uses_slow_voice_below_threshold() {
        let slow = query_params("Olá", 0, 1, &ReadingSettings::new("pt", 0.6));
        assert!(slow.contains(&("ttsspeed", "0.3".to_string())));
        assert!(slow.contains(&("tl", "pt".to_string())));
        assert!(slow.contains(&("textlen", "3".to_string())));

        let normal = query_params("Hello", 1, 2, &ReadingSettings::new("en", 1.5));
        assert!(normal.contains(&("ttsspeed", "1".to_string())));
        assert!(normal.contains(&("idx", "1".to_string())));
        assert!(normal.contains(&("total", "2".to_string())));
    }

    #[test]
    fn unreachable_endpoint_is_request_error_and_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let tts = GoogleTranslateTts::new(
            ArtifactDir::new(dir.path()).unwrap(),
            Duration::from_secs(2),
        )
        .unwrap()
        .with_endpoint("http://127.0.0.1:9/translate_tts");

        let err = tts
            .synthesize("Hello there.", &ReadingSettings::default())
            .unwrap_err();
        assert!(matches!(err, BackendError::Request(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
