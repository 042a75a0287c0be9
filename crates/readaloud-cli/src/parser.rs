//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for reading documents aloud.
#[derive(Parser)]
#[command(name = "readaloud")]
#[command(about = "Read text files aloud, sentence by sentence")]
#[command(version)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::EngineArg;
    use crate::config_commands::ConfigCommand;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "readaloud",
            "--verbose",
            "--config",
            "/tmp/r.json",
            "languages",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/r.json")));
        assert!(matches!(cli.command, Some(Commands::Languages)));
    }

    #[test]
    fn test_read_args() {
        let cli = Cli::parse_from([
            "readaloud", "read", "a.txt", "b.txt", "--language", "en", "--speed", "1.5",
            "--engine", "espeak",
        ]);
        let Some(Commands::Read(args)) = cli.command else {
            panic!("expected read command");
        };
        assert_eq!(args.files, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
        assert_eq!(args.language.as_deref(), Some("en"));
        assert_eq!(args.speed, Some(1.5));
        assert_eq!(args.engine, EngineArg::Espeak);
        assert!(!args.sample);
    }

    #[test]
    fn test_read_requires_input() {
        assert!(Cli::try_parse_from(["readaloud", "read"]).is_err());
        let cli = Cli::try_parse_from(["readaloud", "read", "--sample"]).unwrap();
        let Some(Commands::Read(args)) = cli.command else {
            panic!("expected read command");
        };
        assert!(args.sample);
        assert_eq!(args.engine, EngineArg::Google);
    }

    #[test]
    fn test_config_init_force() {
        let cli = Cli::parse_from(["readaloud", "config", "init", "--force"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                command: ConfigCommand::Init { force: true }
            })
        ));
    }
}
