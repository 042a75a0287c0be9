//! CLI entry point - the composition root.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use readaloud_cli::{Cli, CliConfig, CliError, Commands, handlers};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Read(args) => {
            let config = CliConfig::load(cli.config.as_deref())?;
            handlers::read::execute(&config, args).await?;
        }
        Commands::Segment { file, json } => {
            handlers::segment::execute(&file, json)?;
        }
        Commands::Languages => {
            handlers::languages::execute();
        }
        Commands::Config { command } => {
            let config = CliConfig::load(cli.config.as_deref())?;
            handlers::config::execute(&config, &command)?;
        }
    }
    Ok(())
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
