//! Song catalog transforms

use super::tables::{distinct, ArtistRow, SongRow};
use crate::source::SongRecord;
use std::collections::HashMap;

/// The song catalog exactly as read, shared with the log transforms
///
/// Holds every record (no projection, no deduplication) so the join can see
/// `artist_name` next to `song_id` and `artist_id`.
#[derive(Debug, Clone, Default)]
pub struct SongView {
    records: Vec<SongRecord>,
}

impl SongView {
    pub fn new(records: Vec<SongRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct records grouped by `artist_name`, in catalog order
    ///
    /// Records without an artist name are left out since a null key never
    /// joins.
    pub fn by_artist_name(&self) -> HashMap<&str, Vec<&SongRecord>> {
        let mut index: HashMap<&str, Vec<&SongRecord>> = HashMap::new();
        for record in distinct(self.records.iter()) {
            if let Some(name) = record.artist_name.as_deref() {
                index.entry(name).or_default().push(record);
            }
        }
        index
    }
}

/// Project and deduplicate the `songs` table
pub fn songs_table(records: &[SongRecord]) -> Vec<SongRow> {
    distinct(records.iter().map(SongRow::from))
}

/// Project and deduplicate the `artists` table
pub fn artists_table(records: &[SongRecord]) -> Vec<ArtistRow> {
    distinct(records.iter().map(ArtistRow::from))
}

/// Everything the song pipeline derives
#[derive(Debug, Clone)]
pub struct SongTables {
    pub songs: Vec<SongRow>,
    pub artists: Vec<ArtistRow>,
    pub view: SongView,
}

/// Derive `songs`, `artists` and the view from raw records
pub fn transform_songs(records: Vec<SongRecord>) -> SongTables {
    let songs = songs_table(&records);
    let artists = artists_table(&records);
    SongTables {
        songs,
        artists,
        view: SongView::new(records),
    }
}
