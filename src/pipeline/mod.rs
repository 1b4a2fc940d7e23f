//! Pipeline module
//!
//! Wires storage, transforms and writers into the two pipelines and runs
//! them in order: songs first, since the log pipeline joins against the
//! song view.

mod logs;
mod session;
mod songs;

pub use logs::{process_log_data, LogPipelineOutput};
pub use session::Session;
pub use songs::{process_song_data, SongPipelineOutput};

use crate::error::Result;
use crate::output::TableWriteSummary;
use serde::Serialize;
use std::time::Instant;

/// Per-table results of a full run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: String,
    pub output: String,
    pub tables: Vec<TableWriteSummary>,
    pub skipped_events: usize,
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// Summary of one table by name
    pub fn table(&self, name: &str) -> Option<&TableWriteSummary> {
        self.tables.iter().find(|t| t.table == name)
    }
}

/// Run the song pipeline, then the log pipeline
pub async fn run(session: &Session) -> Result<RunSummary> {
    let started = Instant::now();

    let songs = process_song_data(session).await?;
    let logs = process_log_data(session, &songs.view).await?;

    let summary = RunSummary {
        input: session.input().url(),
        output: session.output().url(),
        tables: vec![
            songs.songs,
            songs.artists,
            logs.users,
            logs.time,
            logs.songplays,
        ],
        skipped_events: logs.skipped_events,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };
    tracing::info!("Run finished in {} ms", summary.elapsed_ms);
    Ok(summary)
}
