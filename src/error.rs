//! Error types for songplay-etl
//!
//! This module defines the error hierarchy for the whole job.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for songplay-etl
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Invalid storage URL '{url}': {message}")]
    InvalidStorageUrl { url: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Input Errors
    // ============================================================================
    #[error("Malformed record in {path} at line {line}: {message}")]
    MalformedRecord {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    // ============================================================================
    // Storage Errors
    // ============================================================================
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Invalid object path: {0}")]
    ObjectPath(#[from] object_store::path::Error),

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error for table '{table}': {message}")]
    Output { table: String, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid storage URL error
    pub fn storage_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidStorageUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a malformed record error
    pub fn malformed(path: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a read error
    pub fn read(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Read {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Output {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Whether the error came from bad input data rather than infrastructure
    pub fn is_data_error(&self) -> bool {
        matches!(self, Error::MalformedRecord { .. })
    }
}

/// Result type alias for songplay-etl
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::malformed("log_data/2018/11/a.json", 3, "expected value");
        assert_eq!(
            err.to_string(),
            "Malformed record in log_data/2018/11/a.json at line 3: expected value"
        );

        let err = Error::output("songs", "boom");
        assert_eq!(err.to_string(), "Output error for table 'songs': boom");
    }

    #[test]
    fn test_is_data_error() {
        assert!(Error::malformed("a.json", 1, "bad").is_data_error());
        assert!(!Error::config("x").is_data_error());
        assert!(!Error::read("a.json", "gone").is_data_error());
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));

        let with_context = result.context("Loading config");
        assert!(with_context.is_err());
        let err = with_context.unwrap_err();
        assert!(err.to_string().contains("Loading config"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_result_with_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));

        let err = result
            .with_context(|| format!("Writing table {}", "time"))
            .unwrap_err();
        assert!(err.to_string().contains("Writing table time"));
    }
}
