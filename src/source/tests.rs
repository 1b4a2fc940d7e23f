//! Tests for source module

use super::*;
use crate::storage::StorageLocation;
use bytes::Bytes;
use object_store::memory::InMemory;
use pretty_assertions::assert_eq;
use std::sync::Arc;

const SONG_JSON: &str = r#"{"num_songs": 1, "artist_id": "ARJIE2Y1187B994AB7", "artist_latitude": null, "artist_longitude": null, "artist_location": "", "artist_name": "Line Renaud", "song_id": "SOUPIRU12A6D4FA1E1", "title": "Der Kleine Dompfaff", "duration": 152.92036, "year": 0}"#;

const LOG_JSON: &str = r#"{"artist":"Harmonia","auth":"Logged In","firstName":"Ryan","gender":"M","itemInSession":0,"lastName":"Smith","length":655.77751,"level":"free","location":"San Jose-Sunnyvale-Santa Clara, CA","method":"PUT","page":"NextSong","registration":1541016707796.0,"sessionId":583,"song":"Sehr kosmisch","status":200,"ts":1542241826796,"userAgent":"Mozilla\/5.0","userId":"26"}
{"artist":null,"auth":"Logged In","firstName":"Ryan","gender":"M","itemInSession":1,"lastName":"Smith","length":null,"level":"free","location":"San Jose-Sunnyvale-Santa Clara, CA","method":"GET","page":"Home","registration":1541016707796.0,"sessionId":583,"song":null,"status":200,"ts":1542241826900,"userAgent":"Mozilla\/5.0","userId":"26"}
"#;

// ============================================================================
// Record Parsing Tests
// ============================================================================

#[test]
fn test_parse_song_record() {
    let records: Vec<SongRecord> = parse_records("song.json", SONG_JSON.as_bytes()).unwrap();
    assert_eq!(records.len(), 1);

    let song = &records[0];
    assert_eq!(song.song_id.as_deref(), Some("SOUPIRU12A6D4FA1E1"));
    assert_eq!(song.artist_name.as_deref(), Some("Line Renaud"));
    assert_eq!(song.year, Some(0));
    assert_eq!(song.duration, Some(152.920_36));
    assert_eq!(song.artist_latitude, None);
    assert_eq!(song.artist_location.as_deref(), Some(""));
}

#[test]
fn test_parse_log_events() {
    let events: Vec<LogEvent> = parse_records("events.json", LOG_JSON.as_bytes()).unwrap();
    assert_eq!(events.len(), 2);

    let play = &events[0];
    assert!(play.is_song_play());
    assert_eq!(play.user_id.as_deref(), Some("26"));
    assert_eq!(play.first_name.as_deref(), Some("Ryan"));
    assert_eq!(play.session_id, Some(583));
    assert_eq!(play.ts, Some(1_542_241_826_796));
    assert_eq!(play.user_agent.as_deref(), Some("Mozilla/5.0"));

    assert!(!events[1].is_song_play());
    assert_eq!(events[1].artist, None);
}

#[test]
fn test_missing_fields_become_none() {
    let records: Vec<SongRecord> = parse_records("s.json", br#"{"song_id": "S1"}"#).unwrap();
    assert_eq!(
        records[0],
        SongRecord {
            song_id: Some("S1".to_string()),
            ..SongRecord::default()
        }
    );
}

#[test]
fn test_numeric_user_id() {
    let events: Vec<LogEvent> = parse_records("e.json", br#"{"userId": 39}"#).unwrap();
    assert_eq!(events[0].user_id.as_deref(), Some("39"));

    let events: Vec<LogEvent> = parse_records("e.json", br#"{"userId": ""}"#).unwrap();
    assert_eq!(events[0].user_id.as_deref(), Some(""));
}

#[test]
fn test_integer_duration_is_widened() {
    let records: Vec<SongRecord> = parse_records("s.json", br#"{"duration": 200}"#).unwrap();
    assert_eq!(records[0].duration, Some(200.0));
}

#[test]
fn test_missing_page_is_not_song_play() {
    let events: Vec<LogEvent> = parse_records("e.json", br#"{"ts": 1}"#).unwrap();
    assert!(!events[0].is_song_play());

    let events: Vec<LogEvent> = parse_records("e.json", br#"{"page": "nextsong"}"#).unwrap();
    assert!(!events[0].is_song_play());
}

#[test]
fn test_pretty_printed_object() {
    let data = b"{\n  \"song_id\": \"S1\",\n  \"year\": 1999\n}\n";
    let records: Vec<SongRecord> = parse_records("s.json", data).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].year, Some(1999));
}

#[test]
fn test_blank_lines_skipped() {
    let data = b"\n{\"song_id\": \"S1\"}\n\n{\"song_id\": \"S2\"}\n\n";
    let records: Vec<SongRecord> = parse_records("s.json", data).unwrap();
    assert_eq!(records.len(), 2);
}

#[test]
fn test_malformed_record_reports_line() {
    let data = b"{\"song_id\": \"S1\"}\n{\"song_id\": \n";
    let err = parse_records::<SongRecord>("bad.json", data).unwrap_err();
    match err {
        crate::Error::MalformedRecord { path, line, .. } => {
            assert_eq!(path, "bad.json");
            assert!(line >= 2);
        }
        other => panic!("Expected MalformedRecord, got {other:?}"),
    }
}

#[test]
fn test_wrong_type_is_malformed() {
    let err = parse_records::<LogEvent>("e.json", br#"{"ts": "yesterday"}"#).unwrap_err();
    assert!(err.is_data_error());
}

// ============================================================================
// Dataset Reader Tests
// ============================================================================

#[tokio::test]
async fn test_read_datasets_from_store() {
    let location = StorageLocation::from_store(Arc::new(InMemory::new()), "memory", "");
    location
        .put("song_data/A/B/C/TRA.json", Bytes::from(SONG_JSON))
        .await
        .unwrap();
    location
        .put("song_data/A/B/C/TRB.json", Bytes::from(SONG_JSON))
        .await
        .unwrap();
    location
        .put("log_data/2018/11/2018-11-15-events.json", Bytes::from(LOG_JSON))
        .await
        .unwrap();

    let songs = read_song_records(&location).await.unwrap();
    assert_eq!(songs.len(), 2);

    let events = read_log_events(&location).await.unwrap();
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn test_read_empty_dataset() {
    let location = StorageLocation::from_store(Arc::new(InMemory::new()), "memory", "");
    let songs = read_song_records(&location).await.unwrap();
    assert!(songs.is_empty());
}

#[tokio::test]
async fn test_read_malformed_file_fails() {
    let location = StorageLocation::from_store(Arc::new(InMemory::new()), "memory", "");
    location
        .put("log_data/2018/11/broken.json", Bytes::from_static(b"{not json"))
        .await
        .unwrap();

    let err = read_log_events(&location).await.unwrap_err();
    assert!(err.to_string().contains("log_data/2018/11/broken.json"));
}
