//! Configuration management subcommands.

use clap::Subcommand;

/// Configuration commands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the config file location and the effective configuration
    Show,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}
