//! Log pipeline: events in, `users`, `time` and `songplays` out

use super::session::Session;
use crate::error::Result;
use crate::output::TableWriteSummary;
use crate::source::read_log_events;
use crate::transform::{transform_logs, SongView};

/// What the log pipeline produced
#[derive(Debug, Clone)]
pub struct LogPipelineOutput {
    pub users: TableWriteSummary,
    pub time: TableWriteSummary,
    pub songplays: TableWriteSummary,
    pub skipped_events: usize,
}

/// Read the event log, join against `view`, write the three tables
pub async fn process_log_data(session: &Session, view: &SongView) -> Result<LogPipelineOutput> {
    tracing::info!("Processing log data from {}", session.input().url());

    if view.is_empty() {
        tracing::warn!("Song view is empty, songplays will be empty");
    }

    let events = read_log_events(session.input()).await?;
    let tables = transform_logs(events, view, session.options());
    tracing::debug!("Skipped {} non-song-play events", tables.skipped_events);

    let users = session.writer().write_table(&tables.users).await?;
    let time = session.writer().write_table(&tables.time).await?;
    let songplays = session.writer().write_table(&tables.songplays).await?;

    Ok(LogPipelineOutput {
        users,
        time,
        songplays,
        skipped_events: tables.skipped_events,
    })
}
