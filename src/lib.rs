// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Song Play ETL
//!
//! Batch job that turns a music streaming service's raw JSON (a song
//! catalog plus user activity logs) into a star schema of Parquet tables.
//!
//! ## Tables
//!
//! - **songs** - partitioned by `year`, `artist_id`
//! - **artists** - unpartitioned
//! - **users** - unpartitioned
//! - **time** - partitioned by `year`, `month`
//! - **songplays** - fact table, partitioned by `year`, `month`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use songplay_etl::{run, EtlConfig, Result, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = EtlConfig::from_file("etl.yaml")?;
//!     let session = Session::bootstrap(&config)?;
//!     let summary = run(&session).await?;
//!     println!("{} songplays", summary.table("songplays").map_or(0, |t| t.rows));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!   song_data/*/*/*/*.json            log_data/*/*/*.json
//!            │                                 │
//!      ┌─────┴─────┐                    ┌──────┴──────┐
//!      │  source   │                    │   source    │
//!      └─────┬─────┘                    └──────┬──────┘
//!      ┌─────┴─────┐     song view      ┌──────┴──────┐
//!      │ transform ├───────────────────►│  transform  │
//!      └─────┬─────┘                    └──────┬──────┘
//!      songs, artists              users, time, songplays
//!            │                                 │
//!            └──────────► output (Parquet) ◄───┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Job configuration
pub mod config;

/// Object store locations and globbing
pub mod storage;

/// Raw song and log record readers
pub mod source;

/// Row derivation, deduplication and the songplay join
pub mod transform;

/// Parquet encoding and partitioned table writing
pub mod output;

/// Song and log pipelines
pub mod pipeline;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::EtlConfig;
pub use error::{Error, Result};
pub use pipeline::{run, RunSummary, Session};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
