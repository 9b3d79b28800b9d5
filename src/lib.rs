//! Audioshelf: an audiobook catalog harvester
//!
//! This crate pages through a remote audiobook catalog, normalizes each item
//! into a flat record, snapshots the records to a JSON sink, and seeds a
//! SQLite store from that sink for paginated browsing.

pub mod config;
pub mod ingest;
pub mod logging;
pub mod output;
pub mod record;
pub mod storage;

use thiserror::Error;

/// Main error type for Audioshelf operations
#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Sink error: {0}")]
    Sink(#[from] output::SinkError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Audioshelf operations
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use ingest::{IngestOutcome, IngestReport, Ingestor};
pub use record::{normalize_text, NormalizedRecord, SeriesInfo};
