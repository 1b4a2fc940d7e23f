//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Song play ETL: song catalog and event logs in, Parquet tables out
#[derive(Parser, Debug)]
#[command(name = "songplay-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Input root holding song_data/ and log_data/
    /// Supports: /path, s3://bucket/path, s3a://, r2://, gs://, az://
    #[arg(short, long, global = true)]
    pub input: Option<String>,

    /// Output root receiving the table directories
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// Access key id for S3-compatible storage
    #[arg(long, global = true, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key_id: Option<String>,

    /// Secret access key for S3-compatible storage
    #[arg(
        long,
        global = true,
        env = "AWS_SECRET_ACCESS_KEY",
        hide_env_values = true
    )]
    pub secret_access_key: Option<String>,

    /// Time zone for timestamp decomposition (local, utc, +HH:MM)
    #[arg(long, global = true)]
    pub timezone: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `run`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the song pipeline and then the log pipeline
    Run,

    /// List the input files each pipeline would read, without writing
    Plan,

    /// Print the effective configuration with secrets masked
    ShowConfig,
}
