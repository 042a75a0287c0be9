//! readaloud command-line interface.
//!
//! `main.rs` is the entry point; everything it dispatches to lives here so
//! parsing and handlers can be tested.

pub mod bootstrap;
pub mod commands;
pub mod config_commands;
pub mod error;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, ReaderContext, bootstrap};
pub use commands::{Commands, EngineArg, ReadArgs};
pub use config_commands::ConfigCommand;
pub use error::CliError;
pub use parser::Cli;
