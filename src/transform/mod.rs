//! Transform module
//!
//! Pure functions that turn raw records into the analytical tables.
//!
//! # Overview
//!
//! - `songs` and `artists` dimensions from the song catalog, plus the
//!   `SongView` handed to the log transforms
//! - `users` and `time` dimensions from song-play events
//! - the `songplays` fact from joining plays to the catalog by artist name

mod logs;
mod songs;
mod tables;
mod time;

pub use logs::{
    songplays_table, stamp_song_plays, time_table, transform_logs, users_table, LogTables,
    StampedPlay, TransformOptions,
};
pub use songs::{artists_table, songs_table, transform_songs, SongTables, SongView};
pub use tables::{distinct, ArtistRow, DistinctKey, SongRow, SongplayRow, TimeRow, UserRow};
pub use time::{decompose, wall_clock, CalendarFields};
