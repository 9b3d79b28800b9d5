//! Output module for harvested data
//!
//! This module handles:
//! - The JSON snapshot shared between the ingestor and the loader
//! - The append-only debug capture of raw catalog items
//! - Rendering stored audiobooks as a paginated listing

mod debug_sink;
mod listing;
mod snapshot;

pub use debug_sink::DebugSink;
pub use listing::{format_duration, render_listing};
pub use snapshot::{read_snapshot, SnapshotWriter};

use thiserror::Error;

/// Errors that can occur while writing or reading sink files
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected sink format: {0}")]
    Format(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;
