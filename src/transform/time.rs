//! Timestamp decomposition
//!
//! Event timestamps are epoch milliseconds. They are turned into a
//! wall-clock value in the session time zone (millisecond precision kept)
//! and split into calendar fields.

use super::tables::TimeRow;
use crate::config::TimeZoneSetting;
use chrono::{Datelike, Local, NaiveDateTime, TimeZone, Timelike, Utc};

/// Calendar fields of one wall-clock instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarFields {
    pub start_time: NaiveDateTime,
    pub hour: i32,
    /// Day of month
    pub day: i32,
    /// ISO-8601 week of year
    pub week: i32,
    pub month: i32,
    pub year: i32,
    /// 1 = Sunday through 7 = Saturday
    pub weekday: i32,
}

impl CalendarFields {
    /// Split a wall-clock value
    pub fn from_wall_clock(start_time: NaiveDateTime) -> Self {
        Self {
            start_time,
            hour: start_time.hour() as i32,
            day: start_time.day() as i32,
            week: start_time.iso_week().week() as i32,
            month: start_time.month() as i32,
            year: start_time.year(),
            weekday: start_time.weekday().number_from_sunday() as i32,
        }
    }
}

impl From<Option<CalendarFields>> for TimeRow {
    fn from(fields: Option<CalendarFields>) -> Self {
        Self {
            start_time: fields.map(|f| f.start_time),
            hour: fields.map(|f| f.hour),
            day: fields.map(|f| f.day),
            week: fields.map(|f| f.week),
            month: fields.map(|f| f.month),
            year: fields.map(|f| f.year),
            weekday: fields.map(|f| f.weekday),
        }
    }
}

/// Convert epoch milliseconds to a wall-clock value
///
/// Returns `None` when the instant is outside chrono's range.
pub fn wall_clock(ts_millis: i64, timezone: TimeZoneSetting) -> Option<NaiveDateTime> {
    match timezone {
        TimeZoneSetting::Local => naive_in(&Local, ts_millis),
        TimeZoneSetting::Utc => naive_in(&Utc, ts_millis),
        TimeZoneSetting::Fixed(offset) => naive_in(&offset, ts_millis),
    }
}

fn naive_in<Tz: TimeZone>(tz: &Tz, ts_millis: i64) -> Option<NaiveDateTime> {
    // An instant maps to exactly one local time, so `single` only fails out of range.
    tz.timestamp_millis_opt(ts_millis)
        .single()
        .map(|dt| dt.naive_local())
}

/// Decompose epoch milliseconds into calendar fields
pub fn decompose(ts_millis: i64, timezone: TimeZoneSetting) -> Option<CalendarFields> {
    wall_clock(ts_millis, timezone).map(CalendarFields::from_wall_clock)
}
