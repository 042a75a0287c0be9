//! CLI-specific error types and exit codes.

use std::path::PathBuf;

use readaloud_core::{BackendError, ConfigError, ReaderError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading controller error.
    #[error("{0}")]
    Reader(#[from] ReaderError),

    /// An input file could not be read.
    #[error("Cannot read {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Audio output or synthesis backend could not be set up.
    #[error("Audio setup failed: {0}")]
    Audio(#[from] BackendError),

    /// Refused to overwrite an existing file.
    #[error("{} already exists (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),
}

impl CliError {
    /// Map error to an exit code following sysexits.h.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Reader(_) => 1,
            Self::Input { .. } => 66, // EX_NOINPUT
            Self::Audio(_) => 69, // EX_UNAVAILABLE
            Self::AlreadyExists(_) => 73, // EX_CANTCREAT
            Self::Config(_) => 78, // EX_CONFIG
        }
    }
}
