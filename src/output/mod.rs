//! Output module
//!
//! Handles Arrow RecordBatch creation and partitioned Parquet writing.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Mapping table rows to Arrow schemas and RecordBatches
//! - Encoding Parquet files in memory
//! - Hive-style partition directories
//! - Replacing a table in an output location, and reading it back

mod partition;
mod sink;
mod tables;
mod writer;

pub use partition::{
    escape_partition_value, parse_partition_path, partition_dir, partition_segment,
    unescape_partition_value, HIVE_DEFAULT_PARTITION,
};
pub use sink::{read_table, TableWriteSummary, TableWriter, SUCCESS_MARKER};
pub use tables::OutputTable;
pub use writer::{encode_parquet, ParquetWriterConfig};
