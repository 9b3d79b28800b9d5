//! Raw item capture for debugging
//!
//! In debug mode every raw catalog item is appended to a newline-delimited
//! JSON file. The file is never truncated, so it accumulates items across
//! runs until removed by hand.

use crate::output::SinkResult;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only NDJSON writer, opened on first use
pub struct DebugSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    written: u64,
}

impl DebugSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Items appended by this sink so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Appends one item as a single line and flushes it
    pub fn append(&mut self, item: &Value) -> SinkResult<()> {
        if self.writer.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            self.writer = Some(BufWriter::new(file));
        }

        if let Some(writer) = self.writer.as_mut() {
            serde_json::to_writer(&mut *writer, item)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            self.written += 1;
        }

        Ok(())
    }
}
