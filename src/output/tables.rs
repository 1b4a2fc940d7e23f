//! Arrow layouts of the output tables

use crate::error::Result;
use crate::transform::{ArtistRow, SongRow, SongplayRow, TimeRow, UserRow};
use arrow::array::{
    ArrayRef, Float64Array, Int32Array, Int64Array, StringArray, TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use std::sync::Arc;

/// A row type that is persisted as one output table
pub trait OutputTable {
    /// Directory name under the output root
    const NAME: &'static str;

    /// Partition columns, outermost first
    const PARTITION_BY: &'static [&'static str];

    /// Schema of the data files (partition columns excluded)
    fn schema() -> SchemaRef;

    /// Values of `PARTITION_BY` for this row
    fn partition_values(&self) -> Vec<Option<String>>;

    /// Build the data columns for a group of rows
    fn to_batch(rows: &[&Self]) -> Result<RecordBatch>;
}

fn utf8(name: &str) -> Field {
    Field::new(name, DataType::Utf8, true)
}

fn timestamp(name: &str) -> Field {
    Field::new(name, DataType::Timestamp(TimeUnit::Microsecond, None), true)
}

fn strings<'a, T: 'a>(rows: &[&'a T], get: impl Fn(&'a T) -> Option<&'a str>) -> ArrayRef {
    Arc::new(StringArray::from(
        rows.iter().map(|r| get(*r)).collect::<Vec<_>>(),
    ))
}

fn floats<T>(rows: &[&T], get: impl Fn(&T) -> Option<f64>) -> ArrayRef {
    Arc::new(Float64Array::from(
        rows.iter().map(|r| get(*r)).collect::<Vec<_>>(),
    ))
}

fn ints<T>(rows: &[&T], get: impl Fn(&T) -> Option<i32>) -> ArrayRef {
    Arc::new(Int32Array::from(
        rows.iter().map(|r| get(*r)).collect::<Vec<_>>(),
    ))
}

fn timestamps<T>(rows: &[&T], get: impl Fn(&T) -> Option<NaiveDateTime>) -> ArrayRef {
    Arc::new(TimestampMicrosecondArray::from(
        rows.iter()
            .map(|r| get(*r).map(|t| t.and_utc().timestamp_micros()))
            .collect::<Vec<_>>(),
    ))
}

// ============================================================================
// songs
// ============================================================================

impl OutputTable for SongRow {
    const NAME: &'static str = "songs";
    const PARTITION_BY: &'static [&'static str] = &["year", "artist_id"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            utf8("song_id"),
            utf8("title"),
            Field::new("duration", DataType::Float64, true),
        ]))
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![self.year.map(|y| y.to_string()), self.artist_id.clone()]
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch> {
        Ok(RecordBatch::try_new(
            Self::schema(),
            vec![
                strings(rows, |r| r.song_id.as_deref()),
                strings(rows, |r| r.title.as_deref()),
                floats(rows, |r| r.duration),
            ],
        )?)
    }
}

// ============================================================================
// artists
// ============================================================================

impl OutputTable for ArtistRow {
    const NAME: &'static str = "artists";
    const PARTITION_BY: &'static [&'static str] = &[];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            utf8("artist_id"),
            utf8("artist_name"),
            utf8("artist_location"),
            Field::new("artist_latitude", DataType::Float64, true),
            Field::new("artist_longitude", DataType::Float64, true),
        ]))
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        Vec::new()
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch> {
        Ok(RecordBatch::try_new(
            Self::schema(),
            vec![
                strings(rows, |r| r.artist_id.as_deref()),
                strings(rows, |r| r.artist_name.as_deref()),
                strings(rows, |r| r.artist_location.as_deref()),
                floats(rows, |r| r.artist_latitude),
                floats(rows, |r| r.artist_longitude),
            ],
        )?)
    }
}

// ============================================================================
// users
// ============================================================================

impl OutputTable for UserRow {
    const NAME: &'static str = "users";
    const PARTITION_BY: &'static [&'static str] = &[];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            utf8("userId"),
            utf8("firstName"),
            utf8("lastName"),
            utf8("gender"),
            utf8("level"),
        ]))
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        Vec::new()
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch> {
        Ok(RecordBatch::try_new(
            Self::schema(),
            vec![
                strings(rows, |r| r.user_id.as_deref()),
                strings(rows, |r| r.first_name.as_deref()),
                strings(rows, |r| r.last_name.as_deref()),
                strings(rows, |r| r.gender.as_deref()),
                strings(rows, |r| r.level.as_deref()),
            ],
        )?)
    }
}

// ============================================================================
// time
// ============================================================================

impl OutputTable for TimeRow {
    const NAME: &'static str = "time";
    const PARTITION_BY: &'static [&'static str] = &["year", "month"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            timestamp("start_time"),
            Field::new("hour", DataType::Int32, true),
            Field::new("day", DataType::Int32, true),
            Field::new("week", DataType::Int32, true),
            Field::new("weekday", DataType::Int32, true),
        ]))
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![
            self.year.map(|y| y.to_string()),
            self.month.map(|m| m.to_string()),
        ]
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch> {
        Ok(RecordBatch::try_new(
            Self::schema(),
            vec![
                timestamps(rows, |r| r.start_time),
                ints(rows, |r| r.hour),
                ints(rows, |r| r.day),
                ints(rows, |r| r.week),
                ints(rows, |r| r.weekday),
            ],
        )?)
    }
}

// ============================================================================
// songplays
// ============================================================================

impl OutputTable for SongplayRow {
    const NAME: &'static str = "songplays";
    const PARTITION_BY: &'static [&'static str] = &["year", "month"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("songplay_id", DataType::Int64, false),
            timestamp("start_time"),
            utf8("userId"),
            utf8("level"),
            utf8("song_id"),
            utf8("artist_id"),
            Field::new("sessionId", DataType::Int64, true),
            utf8("location"),
            utf8("userAgent"),
        ]))
    }

    fn partition_values(&self) -> Vec<Option<String>> {
        vec![
            self.year.map(|y| y.to_string()),
            self.month.map(|m| m.to_string()),
        ]
    }

    fn to_batch(rows: &[&Self]) -> Result<RecordBatch> {
        Ok(RecordBatch::try_new(
            Self::schema(),
            vec![
                Arc::new(Int64Array::from(
                    rows.iter().map(|r| r.songplay_id).collect::<Vec<_>>(),
                )),
                timestamps(rows, |r| r.start_time),
                strings(rows, |r| r.user_id.as_deref()),
                strings(rows, |r| r.level.as_deref()),
                strings(rows, |r| r.song_id.as_deref()),
                strings(rows, |r| r.artist_id.as_deref()),
                Arc::new(Int64Array::from(
                    rows.iter().map(|r| r.session_id).collect::<Vec<_>>(),
                )),
                strings(rows, |r| r.location.as_deref()),
                strings(rows, |r| r.user_agent.as_deref()),
            ],
        )?)
    }
}
