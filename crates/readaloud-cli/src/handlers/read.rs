//! Read command handler: the interactive reading loop.
//!
//! Keys arrive as lines on stdin (`p` toggles pause, `s` or `q` stops). Status
//! is polled every [`STATUS_POLL_INTERVAL`] and printed when it changes, the
//! same way a reader's status bar is refreshed.

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use readaloud_core::settings::is_supported_language;
use readaloud_core::{
    ReadingController, ReadingEvent, ReadingSettings, ReadingState, SAMPLE_TEXT, StartOutcome,
};
use tokio::sync::mpsc;

use crate::bootstrap::{CliConfig, ReaderContext, bootstrap};
use crate::commands::ReadArgs;
use crate::handlers::load_document;

const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A keyboard command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    TogglePause,
    Stop,
}

fn parse_key(line: &str) -> Option<Key> {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "pause" | "" => Some(Key::TogglePause),
        "s" | "q" | "stop" | "quit" => Some(Key::Stop),
        _ => None,
    }
}

/// Execute `readaloud read`.
pub async fn execute(config: &CliConfig, args: ReadArgs) -> Result<()> {
    let text = if args.sample {
        SAMPLE_TEXT.to_string()
    } else {
        load_document(&args.files)?
    };
    let settings = settings_for(&config.reader.reading, &args);
    if !is_supported_language(&settings.language) {
        tracing::warn!(language = %settings.language, "Language is not in the supported list");
    }

    let ReaderContext {
        controller,
        mut events,
    } = bootstrap(&config.reader, args.engine.into())?;
    let controller = Arc::new(controller);

    // `start_reading` may wait up to the stop timeout for a previous session.
    let started = {
        let controller = Arc::clone(&controller);
        tokio::task::spawn_blocking(move || controller.start_reading(&text, settings)).await??
    };
    match started {
        StartOutcome::NothingToRead => {
            println!("Nothing to read.");
            return Ok(());
        }
        StartOutcome::Started { total, .. } => {
            println!("Reading {total} sentences. p + Enter: pause/resume, s + Enter: stop.");
        }
    }

    let mut keys = spawn_key_reader();
    let mut keys_open = true;
    let mut ticker = tokio::time::interval(STATUS_POLL_INTERVAL);
    let mut last_line = String::new();

    let final_status = loop {
        tokio::select! {
            key = keys.recv(), if keys_open => match key {
                Some(Key::TogglePause) => {
                    controller.toggle_pause();
                }
                Some(Key::Stop) => stop_reading(&controller).await,
                None => keys_open = false,
            },
            event = events.recv() => {
                if let Some(ReadingEvent::SentenceStarted { index, total, text, .. }) = event {
                    println!("[{}/{total}] {text}", index + 1);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                stop_reading(&controller).await;
            }
            _ = ticker.tick() => {
                let status = controller.status();
                let line = status.to_string();
                if line != last_line {
                    eprintln!("{line}");
                    last_line = line;
                }
                if !status.is_reading {
                    break status;
                }
            }
        }
    };
    // Join the finished worker here so dropping the controller does not block.
    stop_reading(&controller).await;

    if final_status.state == ReadingState::Error {
        bail!(
            "{}",
            final_status
                .error
                .unwrap_or_else(|| "Reading failed".to_string())
        );
    }
    Ok(())
}

/// Stop on the blocking pool; `stop` waits for the worker to exit.
async fn stop_reading(controller: &Arc<ReadingController>) {
    let controller = Arc::clone(controller);
    match tokio::task::spawn_blocking(move || controller.stop()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "Stop did not complete cleanly"),
        Err(e) => tracing::warn!(error = %e, "Stop task failed"),
    }
}

/// Config defaults overridden by command-line flags.
fn settings_for(defaults: &ReadingSettings, args: &ReadArgs) -> ReadingSettings {
    ReadingSettings {
        language: args
            .language
            .clone()
            .unwrap_or_else(|| defaults.language.clone()),
        speed: args.speed.unwrap_or(defaults.speed),
    }
}

/// Forward stdin lines as keys from a dedicated thread.
///
/// Blocking stdin reads stay off the runtime; the thread ends with stdin and
/// is not joined.
fn spawn_key_reader() -> mpsc::UnboundedReceiver<Key> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("readaloud-keys".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if let Some(key) = parse_key(&line) {
                    if tx.send(key).is_err() {
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "Keyboard control unavailable");
    }
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::EngineArg;
    use readaloud_core::ReaderConfig;
    use readaloud_core::testing::{ScriptedPlayback, ScriptedSynthesis, wait_for};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn args(language: Option<&str>, speed: Option<f32>) -> ReadArgs {
        ReadArgs {
            files: vec![PathBuf::from("book.txt")],
            sample: false,
            language: language.map(str::to_string),
            speed,
            engine: EngineArg::Google,
        }
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("p"), Some(Key::TogglePause));
        assert_eq!(parse_key(""), Some(Key::TogglePause));
        assert_eq!(parse_key(" S "), Some(Key::Stop));
        assert_eq!(parse_key("q"), Some(Key::Stop));
        assert_eq!(parse_key("x"), None);
    }

    #[test]
    fn test_flags_override_config() {
        let defaults = ReadingSettings::new("pt", 1.0);
        assert_eq!(settings_for(&defaults, &args(None, None)), defaults);
        assert_eq!(
            settings_for(&defaults, &args(Some("fr"), Some(0.75))),
            ReadingSettings::new("fr", 0.75)
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_stop_keeps_runtime_responsive() {
        let dir = tempfile::tempdir().unwrap();
        let synthesis =
            Arc::new(ScriptedSynthesis::new(dir.path()).with_delay(Duration::from_millis(400)));
        let playback = Arc::new(ScriptedPlayback::new(Duration::from_millis(10)));
        let (controller, _events) =
            ReadingController::new(synthesis.clone(), playback, &ReaderConfig::default());
        let controller = Arc::new(controller);
        controller
            .start_reading("One slow sentence. Another one.", ReadingSettings::default())
            .unwrap();
        assert!(wait_for(Duration::from_secs(2), || synthesis.call_count() == 1));

        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = {
            let ticks = Arc::clone(&ticks);
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        stop_reading(&controller).await;
        ticker.abort();

        assert!(!controller.is_reading());
        assert!(ticks.load(Ordering::SeqCst) >= 5);
    }
}
