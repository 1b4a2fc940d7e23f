//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::EtlConfig;
use crate::error::Result;
use crate::pipeline::{self, Session};
use crate::source::{LOG_DATA_GLOB, SONG_DATA_GLOB};
use crate::storage::{GlobPattern, StorageLocation};
use serde_json::json;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match self.cli.command.unwrap_or(Commands::Run) {
            Commands::Run => self.run_pipelines().await,
            Commands::Plan => self.plan().await,
            Commands::ShowConfig => self.show_config(),
        }
    }

    /// Config file (or defaults) with command-line overrides applied
    pub fn effective_config(&self) -> Result<EtlConfig> {
        let mut config = match &self.cli.config {
            Some(path) => EtlConfig::from_file(path)?,
            None => EtlConfig::default(),
        };

        if let Some(input) = &self.cli.input {
            config.input.clone_from(input);
        }
        if let Some(output) = &self.cli.output {
            config.output.clone_from(output);
        }
        if let Some(key_id) = &self.cli.access_key_id {
            config.credentials.access_key_id = Some(key_id.clone());
        }
        if let Some(secret) = &self.cli.secret_access_key {
            config.credentials.secret_access_key = Some(secret.clone());
        }
        if let Some(timezone) = &self.cli.timezone {
            config.timezone = timezone.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    async fn run_pipelines(&self) -> Result<()> {
        let config = self.effective_config()?;
        let session = Session::bootstrap(&config)?;
        let summary = pipeline::run(&session).await.inspect_err(|e| {
            if e.is_data_error() {
                tracing::error!("Run stopped on malformed input; tables not yet written were left untouched");
            }
        })?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }

    async fn plan(&self) -> Result<()> {
        let config = self.effective_config()?;
        // Only the input is opened; a local output directory is left uncreated.
        let input = StorageLocation::parse(&config.input, &config.credentials)?;

        let songs = input.glob(&GlobPattern::new(SONG_DATA_GLOB)?).await?;
        let logs = input.glob(&GlobPattern::new(LOG_DATA_GLOB)?).await?;

        let plan = json!({
            "input": input.url(),
            "output": config.output,
            "song_data": songs,
            "log_data": logs,
        });
        println!("{}", serde_json::to_string_pretty(&plan)?);
        Ok(())
    }

    fn show_config(&self) -> Result<()> {
        let config = self.effective_config()?;
        print!("{}", config.to_masked_yaml()?);
        Ok(())
    }
}
