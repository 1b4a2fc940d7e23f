//! Parquet encoding
//!
//! Encodes Arrow RecordBatches into in-memory Parquet files ready to be put
//! into an object store.

use crate::config::{CompressionKind, ParquetSettings};
use crate::error::{Result, ResultExt};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

/// Configuration for Parquet encoding
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
    dictionary_enabled: bool,
    statistics_enabled: bool,
}

impl ParquetWriterConfig {
    /// Codec tag used in file names (`snappy`, `zstd`, `gz`), empty when uncompressed
    pub fn codec_tag(&self) -> &'static str {
        match self.compression {
            Compression::SNAPPY => "snappy",
            Compression::ZSTD(_) => "zstd",
            Compression::GZIP(_) => "gz",
            _ => "",
        }
    }
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
            dictionary_enabled: true,
            statistics_enabled: true,
        }
    }
}

impl From<&ParquetSettings> for ParquetWriterConfig {
    fn from(settings: &ParquetSettings) -> Self {
        let config = Self::new()
            .with_row_group_size(settings.row_group_size)
            .with_dictionary(settings.dictionary)
            .with_statistics(settings.statistics);
        match settings.compression {
            CompressionKind::Snappy => config,
            CompressionKind::Zstd => config.zstd(),
            CompressionKind::Gzip => config.gzip(),
            CompressionKind::None => config.uncompressed(),
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Enable or disable dictionary encoding
    #[must_use]
    pub fn with_dictionary(mut self, enabled: bool) -> Self {
        self.dictionary_enabled = enabled;
        self
    }

    /// Enable or disable statistics
    #[must_use]
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics_enabled = enabled;
        self
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::UNCOMPRESSED;
        self
    }

    /// Use ZSTD compression
    #[must_use]
    pub fn zstd(mut self) -> Self {
        self.compression = Compression::ZSTD(parquet::basic::ZstdLevel::default());
        self
    }

    /// Use GZIP compression
    #[must_use]
    pub fn gzip(mut self) -> Self {
        self.compression = Compression::GZIP(parquet::basic::GzipLevel::default());
        self
    }

    /// Build writer properties
    fn build_properties(&self) -> WriterProperties {
        let mut builder = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size);

        if !self.dictionary_enabled {
            builder = builder.set_dictionary_enabled(false);
        }

        if !self.statistics_enabled {
            builder =
                builder.set_statistics_enabled(parquet::file::properties::EnabledStatistics::None);
        }

        builder.build()
    }
}

/// Encode batches sharing `schema` into one Parquet file
///
/// An empty slice produces a valid zero-row file that still carries the
/// schema.
pub fn encode_parquet(
    schema: SchemaRef,
    batches: &[RecordBatch],
    config: &ParquetWriterConfig,
) -> Result<Bytes> {
    let props = config.build_properties();
    let mut writer = ArrowWriter::try_new(Vec::new(), schema, Some(props))
        .context("Failed to create Parquet writer")?;

    for batch in batches {
        writer.write(batch)?;
    }

    let buffer = writer.into_inner()?;
    Ok(Bytes::from(buffer))
}
