//! Dataset readers

use super::records::{LogEvent, SongRecord};
use super::{LOG_DATA_GLOB, SONG_DATA_GLOB};
use crate::error::{Error, Result};
use crate::storage::{GlobPattern, StorageLocation};
use serde::de::DeserializeOwned;
use serde_json::Deserializer;

/// A JSON dataset stored under a fixed glob
pub trait Dataset: DeserializeOwned {
    /// Glob relative to the input root
    const GLOB: &'static str;
    /// Name used in logs
    const NAME: &'static str;
}

impl Dataset for SongRecord {
    const GLOB: &'static str = SONG_DATA_GLOB;
    const NAME: &'static str = "song_data";
}

impl Dataset for LogEvent {
    const GLOB: &'static str = LOG_DATA_GLOB;
    const NAME: &'static str = "log_data";
}

/// Parse a buffer of JSON objects
///
/// Objects may be newline-delimited or simply concatenated; a single
/// pretty-printed object is accepted too. Any malformed object fails the
/// whole buffer.
pub fn parse_records<T: DeserializeOwned>(source: &str, data: &[u8]) -> Result<Vec<T>> {
    let mut records = Vec::new();
    for record in Deserializer::from_slice(data).into_iter::<T>() {
        match record {
            Ok(record) => records.push(record),
            Err(e) => return Err(Error::malformed(source, e.line(), e.to_string())),
        }
    }
    Ok(records)
}

/// Read every object matching the dataset glob, in key order
pub async fn read_dataset<T: Dataset>(location: &StorageLocation) -> Result<Vec<T>> {
    let glob = GlobPattern::new(T::GLOB)?;
    let keys = location.glob(&glob).await?;

    if keys.is_empty() {
        tracing::warn!(
            "No {} files matched {} under {}",
            T::NAME,
            glob.as_str(),
            location.url()
        );
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for key in &keys {
        let data = location.get(key).await?;
        let parsed: Vec<T> = parse_records(&location.display_key(key), &data)?;
        tracing::debug!("Read {} records from {}", parsed.len(), key);
        records.extend(parsed);
    }

    tracing::info!(
        "Read {} {} records from {} files",
        records.len(),
        T::NAME,
        keys.len()
    );
    Ok(records)
}

/// Read the song catalog
pub async fn read_song_records(location: &StorageLocation) -> Result<Vec<SongRecord>> {
    read_dataset(location).await
}

/// Read the event log
pub async fn read_log_events(location: &StorageLocation) -> Result<Vec<LogEvent>> {
    read_dataset(location).await
}
