//! End-to-end pipeline tests
//!
//! Raw JSON in an input store → both pipelines → Parquet tables read back

use bytes::Bytes;
use object_store::memory::InMemory;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use songplay_etl::config::{TimeZoneSetting, UsersDedup};
use songplay_etl::output::{read_table, ParquetWriterConfig};
use songplay_etl::storage::StorageLocation;
use songplay_etl::transform::TransformOptions;
use songplay_etl::{run, EtlConfig, Session};
use std::sync::Arc;

const BEATLES_SONG: &str = r#"{"num_songs": 1, "artist_id": "AR1", "artist_latitude": 53.4, "artist_longitude": -2.98, "artist_location": "Liverpool", "artist_name": "The Beatles", "song_id": "SO1", "title": "Help!", "duration": 138.0, "year": 1965}"#;

const OTHER_SONG: &str = r#"{"num_songs": 1, "artist_id": "AR2", "artist_latitude": null, "artist_longitude": null, "artist_location": "", "artist_name": "Line Renaud", "song_id": "SO2", "title": "Der Kleine Dompfaff", "duration": 152.92036, "year": 0}"#;

fn event(user_id: &str, level: &str, page: &str, artist: &str, song: &str, ts: i64) -> String {
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": "Lily",
        "gender": "F",
        "itemInSession": 0,
        "lastName": "Koch",
        "length": 138.0,
        "level": level,
        "location": "Chicago-Naperville-Elgin, IL-IN-WI",
        "method": "PUT",
        "page": page,
        "registration": 1_541_048_010_796.0_f64,
        "sessionId": 818,
        "song": song,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0",
        "userId": user_id,
    })
    .to_string()
}

fn memory_location(prefix: &str) -> StorageLocation {
    StorageLocation::from_store(Arc::new(InMemory::new()), "memory", prefix)
}

fn utc_options() -> TransformOptions {
    TransformOptions {
        timezone: TimeZoneSetting::Utc,
        users_dedup: UsersDedup::FullRow,
    }
}

fn memory_session() -> Session {
    Session::from_parts(
        memory_location(""),
        memory_location("analytics"),
        ParquetWriterConfig::default(),
        utc_options(),
    )
}

async fn put(location: &StorageLocation, key: &str, lines: &[String]) {
    location
        .put(key, Bytes::from(lines.join("\n")))
        .await
        .unwrap();
}

async fn seed_beatles(session: &Session) {
    put(
        session.input(),
        "song_data/A/B/C/TRAAAAW128F429D538.json",
        &[BEATLES_SONG.to_string()],
    )
    .await;
    put(
        session.input(),
        "song_data/A/B/D/TRAAABD128F429CF47.json",
        &[OTHER_SONG.to_string()],
    )
    .await;
    put(
        session.input(),
        "log_data/2018/11/2018-11-15-events.json",
        &[
            event("8", "free", "NextSong", "The Beatles", "Help!", 1_542_241_826_796),
            event("10", "paid", "NextSong", "The Beetles", "Help!", 1_542_241_900_000),
            event("9", "free", "Home", "", "", 1_542_241_950_000),
        ],
    )
    .await;
}

fn by_key<'a>(rows: &'a [Value], column: &str, value: &str) -> &'a Value {
    rows.iter()
        .find(|r| r[column] == json!(value))
        .unwrap_or_else(|| panic!("no row with {column}={value}"))
}

// ============================================================================
// Join Behavior
// ============================================================================

#[tokio::test]
async fn test_matching_artist_produces_songplay() {
    let session = memory_session();
    seed_beatles(&session).await;

    let summary = run(&session).await.unwrap();
    assert_eq!(summary.table("songplays").unwrap().rows, 1);

    let songplays = read_table(session.output(), "songplays").await.unwrap();
    assert_eq!(songplays.len(), 1);

    let play = &songplays[0];
    assert_eq!(play["songplay_id"], json!(0));
    assert_eq!(play["userId"], json!("8"));
    assert_eq!(play["level"], json!("free"));
    assert_eq!(play["song_id"], json!("SO1"));
    assert_eq!(play["artist_id"], json!("AR1"));
    assert_eq!(play["sessionId"], json!(818));
    assert_eq!(play["year"], json!("2018"));
    assert_eq!(play["month"], json!("11"));
    assert!(play["start_time"]
        .as_str()
        .unwrap()
        .starts_with("2018-11-15T00:30:26.796"));
}

#[tokio::test]
async fn test_unmatched_artist_still_feeds_users_and_time() {
    let session = memory_session();
    seed_beatles(&session).await;

    let summary = run(&session).await.unwrap();

    // "The Beetles" matches no catalog artist.
    assert_eq!(summary.table("songplays").unwrap().rows, 1);
    assert_eq!(summary.table("users").unwrap().rows, 2);
    assert_eq!(summary.table("time").unwrap().rows, 2);

    let users = read_table(session.output(), "users").await.unwrap();
    assert_eq!(by_key(&users, "userId", "10")["level"], json!("paid"));
}

#[tokio::test]
async fn test_non_song_play_events_are_skipped() {
    let session = memory_session();
    seed_beatles(&session).await;

    let summary = run(&session).await.unwrap();
    assert_eq!(summary.skipped_events, 1);

    let users = read_table(session.output(), "users").await.unwrap();
    assert!(users.iter().all(|u| u["userId"] != json!("9")));
}

// ============================================================================
// Dimension Tables
// ============================================================================

#[tokio::test]
async fn test_song_and_artist_tables() {
    let session = memory_session();
    seed_beatles(&session).await;
    // Same song listed twice in the catalog.
    put(
        session.input(),
        "song_data/A/B/E/TRAAADUP128F429D538.json",
        &[BEATLES_SONG.to_string()],
    )
    .await;

    run(&session).await.unwrap();

    let songs = read_table(session.output(), "songs").await.unwrap();
    assert_eq!(songs.len(), 2);
    let help = by_key(&songs, "song_id", "SO1");
    assert_eq!(help["title"], json!("Help!"));
    assert_eq!(help["year"], json!("1965"));
    assert_eq!(help["artist_id"], json!("AR1"));
    assert_eq!(help["duration"], json!(138.0));

    let artists = read_table(session.output(), "artists").await.unwrap();
    assert_eq!(artists.len(), 2);
    let renaud = by_key(&artists, "artist_id", "AR2");
    assert_eq!(renaud["artist_location"], json!(""));
    assert_eq!(renaud["artist_latitude"], json!(null));
}

#[tokio::test]
async fn test_duplicate_user_events_collapse() {
    let session = memory_session();
    put(
        session.input(),
        "log_data/2018/11/2018-11-20-events.json",
        &[
            event("15", "free", "NextSong", "A", "x", 1_542_700_000_000),
            event("15", "free", "NextSong", "B", "y", 1_542_700_100_000),
            event("15", "paid", "NextSong", "C", "z", 1_542_700_200_000),
        ],
    )
    .await;

    run(&session).await.unwrap();

    // Full-row distinct keeps both levels.
    let users = read_table(session.output(), "users").await.unwrap();
    assert_eq!(users.len(), 2);

    let session = Session::from_parts(
        session.input().clone(),
        session.output().clone(),
        ParquetWriterConfig::default(),
        TransformOptions {
            users_dedup: UsersDedup::LatestLevel,
            ..utc_options()
        },
    );
    run(&session).await.unwrap();

    let users = read_table(session.output(), "users").await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["level"], json!("paid"));
}

#[tokio::test]
async fn test_time_partitions_follow_decomposed_timestamp() {
    let session = memory_session();
    put(
        session.input(),
        "log_data/2018/11/2018-11-30-events.json",
        &[
            // 2018-11-30 23:59:59 UTC and 2018-12-01 00:00:01 UTC
            event("1", "free", "NextSong", "A", "x", 1_543_622_399_000),
            event("1", "free", "NextSong", "A", "x", 1_543_622_401_000),
        ],
    )
    .await;

    run(&session).await.unwrap();

    let keys = session.output().list("time").await.unwrap();
    assert!(keys.iter().any(|k| k.starts_with("time/year=2018/month=11/")));
    assert!(keys.iter().any(|k| k.starts_with("time/year=2018/month=12/")));

    let time = read_table(session.output(), "time").await.unwrap();
    assert_eq!(time.len(), 2);
    let december = by_key(&time, "month", "12");
    assert_eq!(december["day"], json!(1));
    assert_eq!(december["hour"], json!(0));
    assert_eq!(december["weekday"], json!(7));
    assert_eq!(december["week"], json!(48));
}

// ============================================================================
// Layout and Run Semantics
// ============================================================================

#[tokio::test]
async fn test_output_layout() {
    let session = memory_session();
    seed_beatles(&session).await;

    run(&session).await.unwrap();

    let keys = session.output().list("").await.unwrap();
    for table in ["songs", "artists", "users", "time", "songplays"] {
        assert!(
            keys.contains(&format!("{table}/_SUCCESS")),
            "missing marker for {table}"
        );
    }
    assert!(keys
        .iter()
        .any(|k| k.starts_with("songs/year=1965/artist_id=AR1/") && k.ends_with(".parquet")));
    assert!(keys
        .iter()
        .any(|k| k.starts_with("songs/year=0/artist_id=AR2/") && k.ends_with(".parquet")));
    assert!(keys
        .iter()
        .any(|k| k.starts_with("artists/part-") && k.ends_with(".parquet")));
    assert!(keys
        .iter()
        .any(|k| k.starts_with("songplays/year=2018/month=11/")));
}

#[tokio::test]
async fn test_empty_input_writes_empty_tables() {
    let session = memory_session();

    let summary = run(&session).await.unwrap();
    assert_eq!(summary.tables.len(), 5);
    assert!(summary.tables.iter().all(|t| t.rows == 0));

    // Unpartitioned tables still get one (empty) data file.
    let keys = session.output().list("").await.unwrap();
    assert_eq!(
        keys,
        vec![
            "artists/_SUCCESS".to_string(),
            "artists/part-00000.snappy.parquet".to_string(),
            "songplays/_SUCCESS".to_string(),
            "songs/_SUCCESS".to_string(),
            "time/_SUCCESS".to_string(),
            "users/_SUCCESS".to_string(),
            "users/part-00000.snappy.parquet".to_string(),
        ]
    );
    assert!(read_table(session.output(), "users").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_input_fails_run() {
    let session = memory_session();
    seed_beatles(&session).await;
    session
        .input()
        .put(
            "log_data/2018/11/2018-11-16-events.json",
            Bytes::from_static(b"{\"userId\": \"3\", \"page\": "),
        )
        .await
        .unwrap();

    let err = run(&session).await.unwrap_err();
    assert!(err.is_data_error());
    assert!(err.to_string().contains("2018-11-16-events.json"));
}

#[tokio::test]
async fn test_files_outside_globs_are_ignored() {
    let session = memory_session();
    seed_beatles(&session).await;
    put(
        session.input(),
        "song_data/A/B/stray.json",
        &[r#"{"song_id": "STRAY"}"#.to_string()],
    )
    .await;
    put(
        session.input(),
        "log_data/2018/11/notes.txt",
        &["not json at all".to_string()],
    )
    .await;

    let summary = run(&session).await.unwrap();
    assert_eq!(summary.table("songs").unwrap().rows, 2);
}

#[tokio::test]
async fn test_rerun_on_local_dirs_overwrites() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let config_path = input.path().join("etl.yaml");
    std::fs::write(
        &config_path,
        format!(
            "input: {}\noutput: {}\ntimezone: utc\nparquet:\n  compression: zstd\n",
            input.path().display(),
            output.path().display()
        ),
    )
    .unwrap();

    let song_dir = input.path().join("song_data/A/B/C");
    std::fs::create_dir_all(&song_dir).unwrap();
    std::fs::write(song_dir.join("TRAAAAW128F429D538.json"), BEATLES_SONG).unwrap();

    let config = EtlConfig::from_file(&config_path).unwrap();
    let session = Session::bootstrap(&config).unwrap();
    run(&session).await.unwrap();
    assert!(output
        .path()
        .join("songs/year=1965/artist_id=AR1/part-00000.zstd.parquet")
        .exists());

    // Second run with a different catalog replaces the songs table.
    std::fs::write(song_dir.join("TRAAAAW128F429D538.json"), OTHER_SONG).unwrap();
    let summary = run(&session).await.unwrap();
    assert_eq!(summary.table("songs").unwrap().rows, 1);

    assert!(!output.path().join("songs/year=1965").join("artist_id=AR1").join("part-00000.zstd.parquet").exists());
    let songs = read_table(session.output(), "songs").await.unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0]["song_id"], json!("SO2"));
}
