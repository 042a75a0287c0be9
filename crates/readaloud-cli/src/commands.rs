//! Main commands enum and primary subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use readaloud_audio::SynthesisEngine;

use crate::config_commands::ConfigCommand;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Read text files aloud (p + Enter pauses/resumes, s + Enter stops)
    Read(ReadArgs),

    /// Print the sentences a file would be read as, without speaking
    Segment {
        /// Text file to segment
        file: PathBuf,
        /// Print the sentences as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the languages offered for reading
    Languages,

    /// View or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments of `readaloud read`.
#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Text files to read; several files are read as consecutive chapters
    #[arg(required_unless_present = "sample")]
    pub files: Vec<PathBuf>,

    /// Read the built-in test sentence instead of files
    #[arg(long, conflicts_with = "files")]
    pub sample: bool,

    /// Language code (overrides the config file)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Speed multiplier between 0.5 and 2.0 (overrides the config file)
    #[arg(short, long)]
    pub speed: Option<f32>,

    /// Synthesis engine
    #[arg(short, long, value_enum, default_value_t = EngineArg::Google)]
    pub engine: EngineArg,
}

/// Synthesis engine choices on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    /// Google Translate voices (online)
    Google,
    /// espeak-ng voices (offline, needs espeak-ng installed)
    Espeak,
}

impl From<EngineArg> for SynthesisEngine {
    fn from(engine: EngineArg) -> Self {
        match engine {
            EngineArg::Google => Self::Google,
            EngineArg::Espeak => Self::Espeak,
        }
    }
}
