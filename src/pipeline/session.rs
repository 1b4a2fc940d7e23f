//! Execution context shared by both pipelines

use crate::config::EtlConfig;
use crate::error::Result;
use crate::output::{ParquetWriterConfig, TableWriter};
use crate::storage::StorageLocation;
use crate::transform::TransformOptions;

/// Storage handles and settings for one run
#[derive(Debug, Clone)]
pub struct Session {
    input: StorageLocation,
    writer: TableWriter,
    options: TransformOptions,
}

impl Session {
    /// Build the session from an explicit config
    ///
    /// Credentials come from `config` only; the process environment is not
    /// modified.
    pub fn bootstrap(config: &EtlConfig) -> Result<Self> {
        config.validate()?;

        let input = StorageLocation::parse(&config.input, &config.credentials)?;
        let output = StorageLocation::parse(&config.output, &config.credentials)?;
        for location in [&input, &output] {
            if location.is_cloud() && !config.credentials.has_keys() {
                tracing::info!(
                    "No access keys configured for {}, using the store's default credential chain",
                    location.url()
                );
            }
        }
        tracing::info!("Session ready: {} -> {}", input.url(), output.url());

        Ok(Self::from_parts(
            input,
            output,
            ParquetWriterConfig::from(&config.parquet),
            TransformOptions {
                timezone: config.timezone,
                users_dedup: config.users_dedup,
            },
        ))
    }

    /// Assemble a session from already-built parts
    pub fn from_parts(
        input: StorageLocation,
        output: StorageLocation,
        parquet: ParquetWriterConfig,
        options: TransformOptions,
    ) -> Self {
        Self {
            input,
            writer: TableWriter::new(output, parquet),
            options,
        }
    }

    pub fn input(&self) -> &StorageLocation {
        &self.input
    }

    pub fn output(&self) -> &StorageLocation {
        self.writer.location()
    }

    pub fn writer(&self) -> &TableWriter {
        &self.writer
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }
}
