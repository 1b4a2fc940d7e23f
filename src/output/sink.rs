//! Table persistence
//!
//! Writes a whole table under `{output}/{table}/`, replacing whatever a
//! previous run left there.

use super::partition::{parse_partition_path, partition_dir};
use super::tables::OutputTable;
use super::writer::{encode_parquet, ParquetWriterConfig};
use crate::error::{Error, Result};
use crate::storage::StorageLocation;
use arrow::json::writer::JsonArray;
use arrow::json::WriterBuilder;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Marker written once a table is complete
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Outcome of writing one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableWriteSummary {
    pub table: String,
    pub rows: usize,
    pub files: usize,
    pub partitions: usize,
}

/// Writes tables as Parquet into an output location
#[derive(Debug, Clone)]
pub struct TableWriter {
    location: StorageLocation,
    config: ParquetWriterConfig,
}

impl TableWriter {
    pub fn new(location: StorageLocation, config: ParquetWriterConfig) -> Self {
        Self { location, config }
    }

    pub fn location(&self) -> &StorageLocation {
        &self.location
    }

    fn file_name(&self) -> String {
        match self.config.codec_tag() {
            "" => "part-00000.parquet".to_string(),
            codec => format!("part-00000.{codec}.parquet"),
        }
    }

    /// Replace the table with `rows`
    ///
    /// Rows are grouped by partition values; each group becomes one file.
    /// Unpartitioned tables always get one file, even when empty.
    pub async fn write_table<T: OutputTable>(&self, rows: &[T]) -> Result<TableWriteSummary> {
        let table = T::NAME;

        let removed = self.location.delete_dir(table).await?;
        if removed > 0 {
            tracing::debug!("Removed {} stale objects from {}", removed, table);
        }

        // Keyed by the rendered directory: null, "" and the default marker share one.
        let mut groups: BTreeMap<String, Vec<&T>> = BTreeMap::new();
        if T::PARTITION_BY.is_empty() {
            groups.insert(String::new(), rows.iter().collect());
        } else {
            for row in rows {
                let dir = partition_dir(T::PARTITION_BY, &row.partition_values());
                groups.entry(dir).or_default().push(row);
            }
        }

        let file_name = self.file_name();
        let mut files = 0;
        for (dir, group) in &groups {
            let batch = T::to_batch(group)?;
            let data = encode_parquet(T::schema(), &[batch], &self.config)
                .map_err(|e| Error::output(table, e.to_string()))?;

            let key = if dir.is_empty() {
                format!("{table}/{file_name}")
            } else {
                format!("{table}/{dir}/{file_name}")
            };
            let url = self.location.put(&key, data).await?;
            tracing::debug!("Wrote {} rows to {}", group.len(), url);
            files += 1;
        }

        self.location
            .put(&format!("{table}/{SUCCESS_MARKER}"), Bytes::new())
            .await?;

        let summary = TableWriteSummary {
            table: table.to_string(),
            rows: rows.len(),
            files,
            partitions: if T::PARTITION_BY.is_empty() {
                0
            } else {
                groups.len()
            },
        };
        tracing::info!(
            "Wrote table {} ({} rows, {} files) to {}",
            table,
            summary.rows,
            summary.files,
            self.location.display_key(table)
        );
        Ok(summary)
    }
}

/// Read a written table back as JSON rows
///
/// Partition columns are restored from the directory names (as strings,
/// null for the default partition). Files are visited in key order.
pub async fn read_table(location: &StorageLocation, table: &str) -> Result<Vec<Value>> {
    let keys = location.list(table).await?;
    let mut rows = Vec::new();

    for key in keys.iter().filter(|k| k.ends_with(".parquet")) {
        let data = location.get(key).await?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(data)?.build()?;

        let mut writer = WriterBuilder::new()
            .with_explicit_nulls(true)
            .build::<_, JsonArray>(Vec::new());
        for batch in reader {
            writer.write(&batch?)?;
        }
        writer.finish()?;
        let buffer = writer.into_inner();

        let file_rows: Vec<Map<String, Value>> = if buffer.is_empty() {
            Vec::new()
        } else {
            serde_json::from_slice(&buffer)?
        };

        let partitions = parse_partition_path(key);
        for mut row in file_rows {
            for (column, value) in &partitions {
                row.insert(
                    column.clone(),
                    value.clone().map_or(Value::Null, Value::String),
                );
            }
            rows.push(Value::Object(row));
        }
    }

    Ok(rows)
}
