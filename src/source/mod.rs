//! Source module
//!
//! Reads the raw song catalog and event logs from a storage location.
//!
//! # Overview
//!
//! - Typed records for both datasets, tolerant of missing fields
//! - Reading every object that matches a dataset glob into records

mod reader;
mod records;

pub use reader::{parse_records, read_dataset, read_log_events, read_song_records, Dataset};
pub use records::{LogEvent, SongRecord, NEXT_SONG_PAGE};

/// Song catalog files, relative to the input root
pub const SONG_DATA_GLOB: &str = "song_data/*/*/*/*.json";

/// Event log files, relative to the input root
pub const LOG_DATA_GLOB: &str = "log_data/*/*/*.json";

#[cfg(test)]
mod tests;
