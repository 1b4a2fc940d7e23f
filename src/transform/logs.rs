//! Event log transforms

use super::songs::SongView;
use super::tables::{distinct, SongplayRow, TimeRow, UserRow};
use super::time::{decompose, CalendarFields};
use crate::config::{TimeZoneSetting, UsersDedup};
use crate::source::LogEvent;
use std::collections::HashMap;

/// Settings that change how logs are transformed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    pub timezone: TimeZoneSetting,
    pub users_dedup: UsersDedup,
}

/// A song play with its timestamp already decomposed
///
/// Both `time` and `songplays` read `calendar` from here, so they always
/// agree on `start_time`.
#[derive(Debug, Clone)]
pub struct StampedPlay {
    pub event: LogEvent,
    pub calendar: Option<CalendarFields>,
}

/// Keep song plays only and decompose their timestamps
pub fn stamp_song_plays(events: Vec<LogEvent>, timezone: TimeZoneSetting) -> Vec<StampedPlay> {
    events
        .into_iter()
        .filter(LogEvent::is_song_play)
        .map(|event| {
            let calendar = event.ts.and_then(|ts| decompose(ts, timezone));
            StampedPlay { event, calendar }
        })
        .collect()
}

fn user_row(event: &LogEvent) -> UserRow {
    UserRow {
        user_id: event.user_id.clone(),
        first_name: event.first_name.clone(),
        last_name: event.last_name.clone(),
        gender: event.gender.clone(),
        level: event.level.clone(),
    }
}

/// Project and deduplicate the `users` table
pub fn users_table(plays: &[StampedPlay], strategy: UsersDedup) -> Vec<UserRow> {
    match strategy {
        UsersDedup::FullRow => distinct(plays.iter().map(|p| user_row(&p.event))),
        UsersDedup::LatestLevel => latest_user_rows(plays),
    }
}

/// One row per userId from the event with the greatest `ts`
///
/// Ties go to the later event. Users come out in order of first appearance.
fn latest_user_rows(plays: &[StampedPlay]) -> Vec<UserRow> {
    let mut order: Vec<Option<&str>> = Vec::new();
    let mut latest: HashMap<Option<&str>, &LogEvent> = HashMap::new();

    for play in plays {
        let key = play.event.user_id.as_deref();
        match latest.get(&key).map(|current| current.ts) {
            None => {
                order.push(key);
                latest.insert(key, &play.event);
            }
            Some(current_ts) if play.event.ts >= current_ts => {
                latest.insert(key, &play.event);
            }
            Some(_) => {}
        }
    }

    order
        .into_iter()
        .filter_map(|key| latest.get(&key).map(|event| user_row(event)))
        .collect()
}

/// Project and deduplicate the `time` table
pub fn time_table(plays: &[StampedPlay]) -> Vec<TimeRow> {
    distinct(plays.iter().map(|p| TimeRow::from(p.calendar)))
}

/// Join plays to the catalog on artist name and number the result
///
/// Inner join on `event.artist == song.artist_name`; plays whose artist is
/// null or unknown are dropped. The catalog is made distinct before the
/// join and the projected rows after it, then ids run from 0 in row order.
///
/// `year` and `month` come from the decomposed `start_time`; the raw
/// `year`/`month` fields of the event are ignored.
pub fn songplays_table(plays: &[StampedPlay], view: &SongView) -> Vec<SongplayRow> {
    let index = view.by_artist_name();
    let index = &index;

    let joined = plays.iter().flat_map(move |play| {
        let matches = play
            .event
            .artist
            .as_deref()
            .and_then(|artist| index.get(artist))
            .map_or(&[][..], Vec::as_slice);

        matches.iter().map(move |song| SongplayRow {
            songplay_id: 0,
            start_time: play.calendar.map(|c| c.start_time),
            user_id: play.event.user_id.clone(),
            level: play.event.level.clone(),
            song_id: song.song_id.clone(),
            artist_id: song.artist_id.clone(),
            session_id: play.event.session_id,
            location: play.event.location.clone(),
            user_agent: play.event.user_agent.clone(),
            year: play.calendar.map(|c| c.year),
            month: play.calendar.map(|c| c.month),
        })
    });

    distinct(joined)
        .into_iter()
        .zip(0_i64..)
        .map(|(row, id)| SongplayRow {
            songplay_id: id,
            ..row
        })
        .collect()
}

/// Everything the log pipeline derives
#[derive(Debug, Clone)]
pub struct LogTables {
    pub users: Vec<UserRow>,
    pub time: Vec<TimeRow>,
    pub songplays: Vec<SongplayRow>,
    /// Events dropped by the `NextSong` filter
    pub skipped_events: usize,
}

/// Derive `users`, `time` and `songplays` from raw events
pub fn transform_logs(
    events: Vec<LogEvent>,
    view: &SongView,
    options: &TransformOptions,
) -> LogTables {
    let total = events.len();
    let plays = stamp_song_plays(events, options.timezone);
    let skipped_events = total - plays.len();

    LogTables {
        users: users_table(&plays, options.users_dedup),
        time: time_table(&plays),
        songplays: songplays_table(&plays, view),
        skipped_events,
    }
}
