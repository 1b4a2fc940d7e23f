//! Song pipeline: catalog in, `songs` and `artists` out

use super::session::Session;
use crate::error::Result;
use crate::output::TableWriteSummary;
use crate::source::read_song_records;
use crate::transform::{transform_songs, SongView};

/// What the song pipeline produced
#[derive(Debug, Clone)]
pub struct SongPipelineOutput {
    pub songs: TableWriteSummary,
    pub artists: TableWriteSummary,
    /// Raw catalog for the log pipeline's join
    pub view: SongView,
}

/// Read the catalog, write `songs` and `artists`, return the view
pub async fn process_song_data(session: &Session) -> Result<SongPipelineOutput> {
    tracing::info!("Processing song data from {}", session.input().url());

    let records = read_song_records(session.input()).await?;
    let tables = transform_songs(records);
    tracing::debug!("Song view holds {} records", tables.view.len());

    let songs = session.writer().write_table(&tables.songs).await?;
    let artists = session.writer().write_table(&tables.artists).await?;

    Ok(SongPipelineOutput {
        songs,
        artists,
        view: tables.view,
    })
}
