//! Config command handler.

use anyhow::Result;
use readaloud_core::ReaderConfig;

use crate::bootstrap::CliConfig;
use crate::config_commands::ConfigCommand;
use crate::error::CliError;

/// Execute the config command.
pub fn execute(config: &CliConfig, command: &ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => show(config),
        ConfigCommand::Init { force } => {
            init(config, *force)?;
            println!("✓ Wrote default configuration to {}", config.path.display());
            Ok(())
        }
    }
}

fn show(config: &CliConfig) -> Result<()> {
    let state = if config.path.exists() { "" } else { " (not created, using defaults)" };
    println!("Config file: {}{state}", config.path.display());
    println!(
        "Artifact directory: {}",
        config.reader.resolve_artifact_dir().display()
    );
    println!("{}", serde_json::to_string_pretty(&config.reader)?);
    Ok(())
}

fn init(config: &CliConfig, force: bool) -> Result<(), CliError> {
    if config.path.exists() && !force {
        return Err(CliError::AlreadyExists(config.path.clone()));
    }
    ReaderConfig::default().save(&config.path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig {
            path: dir.path().join("readaloud").join("config.json"),
            reader: ReaderConfig::default(),
        };

        init(&config, false).unwrap();
        assert!(config.path.exists());
        assert!(matches!(
            init(&config, false),
            Err(CliError::AlreadyExists(_))
        ));
        init(&config, true).unwrap();
        assert_eq!(ReaderConfig::load(&config.path).unwrap(), ReaderConfig::default());
    }
}
