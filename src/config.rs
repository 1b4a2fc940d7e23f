//! Job configuration
//!
//! This module contains the structures used to configure a run. A config is
//! usually loaded from YAML and then overridden from the command line.

use crate::error::{Error, Result, ResultExt};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default input root (the public song/log dataset)
pub const DEFAULT_INPUT: &str = "s3a://udacity-dend/";

/// Default output root
pub const DEFAULT_OUTPUT: &str = "s3a://dend/analytics/";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete job configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Root URL holding `song_data/` and `log_data/`
    #[serde(default = "default_input")]
    pub input: String,

    /// Root URL receiving the table directories
    #[serde(default = "default_output")]
    pub output: String,

    /// Object storage credentials
    #[serde(default)]
    pub credentials: Credentials,

    /// Time zone used to decompose event timestamps
    #[serde(default)]
    pub timezone: TimeZoneSetting,

    /// How the users dimension is deduplicated
    #[serde(default)]
    pub users_dedup: UsersDedup,

    /// Parquet writer settings
    #[serde(default)]
    pub parquet: ParquetSettings,
}

fn default_input() -> String {
    DEFAULT_INPUT.to_string()
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            credentials: Credentials::default(),
            timezone: TimeZoneSetting::default(),
            users_dedup: UsersDedup::default(),
            parquet: ParquetSettings::default(),
        }
    }
}

impl EtlConfig {
    /// Load a config from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse a config from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check field values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.input.trim().is_empty() {
            return Err(Error::invalid_value("input", "must not be empty"));
        }
        if self.output.trim().is_empty() {
            return Err(Error::invalid_value("output", "must not be empty"));
        }
        if self.parquet.row_group_size == 0 {
            return Err(Error::invalid_value(
                "parquet.row_group_size",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Render as YAML with secrets replaced
    pub fn to_masked_yaml(&self) -> Result<String> {
        let mut masked = self.clone();
        masked.credentials = masked.credentials.masked();
        Ok(serde_yaml::to_string(&masked)?)
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// S3-style access credentials, applied explicitly to storage builders
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub access_key_id: Option<String>,

    #[serde(default)]
    pub secret_access_key: Option<String>,

    #[serde(default)]
    pub session_token: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint (R2, MinIO, ...)
    #[serde(default)]
    pub endpoint: Option<String>,
}

const MASK: &str = "********";

impl Credentials {
    /// Whether an access key pair is present
    pub fn has_keys(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }

    fn masked(&self) -> Self {
        Self {
            access_key_id: self.access_key_id.as_ref().map(|_| MASK.to_string()),
            secret_access_key: self.secret_access_key.as_ref().map(|_| MASK.to_string()),
            session_token: self.session_token.as_ref().map(|_| MASK.to_string()),
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}

// Never print key material.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked = self.masked();
        f.debug_struct("Credentials")
            .field("access_key_id", &masked.access_key_id)
            .field("secret_access_key", &masked.secret_access_key)
            .field("session_token", &masked.session_token)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

// ============================================================================
// Time Zone
// ============================================================================

/// Time zone in which epoch timestamps become wall-clock values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeZoneSetting {
    /// The host's local time zone
    #[default]
    Local,
    /// Coordinated Universal Time
    Utc,
    /// A fixed offset from UTC
    Fixed(FixedOffset),
}

impl FromStr for TimeZoneSetting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "utc" | "z" | "+00:00" => Ok(Self::Utc),
            other => parse_offset(other)
                .map(Self::Fixed)
                .ok_or_else(|| Error::invalid_value("timezone", format!("unrecognised '{s}'"))),
        }
    }
}

/// Parse `+HH:MM` / `-HH:MM` (or `+HHMM`)
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl TryFrom<String> for TimeZoneSetting {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeZoneSetting> for String {
    fn from(value: TimeZoneSetting) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeZoneSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Utc => f.write_str("utc"),
            Self::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

// ============================================================================
// Users Deduplication
// ============================================================================

/// Strategy for collapsing the users dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsersDedup {
    /// Distinct on the whole row; a level change yields a second row
    #[default]
    FullRow,
    /// One row per userId, taken from that user's latest event
    LatestLevel,
}

// ============================================================================
// Parquet Settings
// ============================================================================

/// Compression codec for output files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionKind {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    None,
}

/// Parquet writer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParquetSettings {
    #[serde(default)]
    pub compression: CompressionKind,

    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,

    /// Dictionary-encode columns
    #[serde(default = "default_true")]
    pub dictionary: bool,

    /// Write column statistics
    #[serde(default = "default_true")]
    pub statistics: bool,
}

fn default_true() -> bool {
    true
}

fn default_row_group_size() -> usize {
    1024 * 1024
}

impl Default for ParquetSettings {
    fn default() -> Self {
        Self {
            compression: CompressionKind::default(),
            row_group_size: default_row_group_size(),
            dictionary: true,
            statistics: true,
        }
    }
}
