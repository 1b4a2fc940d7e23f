//! Output table rows and row-level deduplication

use crate::source::SongRecord;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;
use std::hash::Hash;

/// Rows that can be compared for full-row distinctness
///
/// Float columns are compared by bit pattern after folding `-0.0` into
/// `0.0` and every NaN into one value, so `distinct` stays total.
pub trait DistinctKey {
    type Key: Hash + Eq;

    fn distinct_key(&self) -> Self::Key;
}

/// Drop repeated rows, keeping the first occurrence and input order
pub fn distinct<T: DistinctKey>(rows: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(row.distinct_key()))
        .collect()
}

fn float_key(value: Option<f64>) -> Option<u64> {
    value.map(|v| {
        if v.is_nan() {
            f64::NAN.to_bits()
        } else if v == 0.0 {
            0.0_f64.to_bits()
        } else {
            v.to_bits()
        }
    })
}

// ============================================================================
// Dimension Rows
// ============================================================================

/// Row of the `songs` table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongRow {
    pub song_id: Option<String>,
    pub title: Option<String>,
    pub artist_id: Option<String>,
    pub year: Option<i64>,
    pub duration: Option<f64>,
}

impl From<&SongRecord> for SongRow {
    fn from(record: &SongRecord) -> Self {
        Self {
            song_id: record.song_id.clone(),
            title: record.title.clone(),
            artist_id: record.artist_id.clone(),
            year: record.year,
            duration: record.duration,
        }
    }
}

impl DistinctKey for SongRow {
    type Key = (
        Option<String>,
        Option<String>,
        Option<String>,
        Option<i64>,
        Option<u64>,
    );

    fn distinct_key(&self) -> Self::Key {
        (
            self.song_id.clone(),
            self.title.clone(),
            self.artist_id.clone(),
            self.year,
            float_key(self.duration),
        )
    }
}

/// Row of the `artists` table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistRow {
    pub artist_id: Option<String>,
    pub artist_name: Option<String>,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
}

impl From<&SongRecord> for ArtistRow {
    fn from(record: &SongRecord) -> Self {
        Self {
            artist_id: record.artist_id.clone(),
            artist_name: record.artist_name.clone(),
            artist_location: record.artist_location.clone(),
            artist_latitude: record.artist_latitude,
            artist_longitude: record.artist_longitude,
        }
    }
}

impl DistinctKey for ArtistRow {
    type Key = (
        Option<String>,
        Option<String>,
        Option<String>,
        Option<u64>,
        Option<u64>,
    );

    fn distinct_key(&self) -> Self::Key {
        (
            self.artist_id.clone(),
            self.artist_name.clone(),
            self.artist_location.clone(),
            float_key(self.artist_latitude),
            float_key(self.artist_longitude),
        )
    }
}

impl DistinctKey for SongRecord {
    type Key = (<SongRow as DistinctKey>::Key, <ArtistRow as DistinctKey>::Key);

    fn distinct_key(&self) -> Self::Key {
        (
            SongRow::from(self).distinct_key(),
            ArtistRow::from(self).distinct_key(),
        )
    }
}

impl<T: DistinctKey> DistinctKey for &T {
    type Key = T::Key;

    fn distinct_key(&self) -> Self::Key {
        (*self).distinct_key()
    }
}

/// Row of the `users` table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UserRow {
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

impl DistinctKey for UserRow {
    type Key = Self;

    fn distinct_key(&self) -> Self::Key {
        self.clone()
    }
}

/// Row of the `time` table
///
/// A null `ts` yields a row whose every column is null.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TimeRow {
    pub start_time: Option<NaiveDateTime>,
    pub hour: Option<i32>,
    pub day: Option<i32>,
    pub week: Option<i32>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub weekday: Option<i32>,
}

impl DistinctKey for TimeRow {
    type Key = Self;

    fn distinct_key(&self) -> Self::Key {
        self.clone()
    }
}

// ============================================================================
// Fact Rows
// ============================================================================

/// Row of the `songplays` fact table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongplayRow {
    pub songplay_id: i64,
    pub start_time: Option<NaiveDateTime>,
    pub user_id: Option<String>,
    pub level: Option<String>,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
}

/// Every column except the synthetic id
impl DistinctKey for SongplayRow {
    type Key = (
        Option<NaiveDateTime>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<i64>,
        Option<String>,
        Option<String>,
        Option<i32>,
        Option<i32>,
    );

    fn distinct_key(&self) -> Self::Key {
        (
            self.start_time,
            self.user_id.clone(),
            self.level.clone(),
            self.song_id.clone(),
            self.artist_id.clone(),
            self.session_id,
            self.location.clone(),
            self.user_agent.clone(),
            self.year,
            self.month,
        )
    }
}
