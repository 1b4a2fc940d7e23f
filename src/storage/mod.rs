//! Storage module
//!
//! Object storage access shared by the readers and the table writers.
//!
//! # Overview
//!
//! - Parsing location URLs into object stores (S3, R2, GCS, Azure, local, memory)
//! - Listing keys that match path globs
//! - Reading, writing and clearing objects under a location root

mod glob;
mod location;

pub use glob::GlobPattern;
pub use location::StorageLocation;
