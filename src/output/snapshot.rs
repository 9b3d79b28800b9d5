//! JSON snapshot of harvested records
//!
//! The snapshot is the hand-off between the ingestor and the loader: a
//! pretty-printed UTF-8 JSON array that is always replaced as a whole.

use crate::output::{SinkError, SinkResult};
use crate::record::NormalizedRecord;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes the accumulated records to the snapshot file
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the snapshot with `records`
    ///
    /// The array is written to a sibling temporary file first and renamed
    /// over the snapshot, so a reader never sees a half-written file.
    pub fn write(&self, records: &[NormalizedRecord]) -> SinkResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, records)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Reads a snapshot back
///
/// Entries that are not objects are skipped with a warning. Inside an
/// object, missing keys and values of the wrong shape take their empty
/// defaults field by field.
///
/// # Returns
///
/// * `Ok(Some(records))` - The snapshot exists and is a JSON array
/// * `Ok(None)` - No snapshot at `path`
/// * `Err(SinkError)` - The file could not be read or is not a JSON array
pub fn read_snapshot(path: &Path) -> SinkResult<Option<Vec<NormalizedRecord>>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let entries = match serde_json::from_str::<Value>(&content)? {
        Value::Array(entries) => entries,
        _ => {
            return Err(SinkError::Format(format!(
                "{} does not contain a JSON array",
                path.display()
            )))
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        if !entry.is_object() {
            tracing::warn!("Skipping snapshot entry {}: not an object", index);
            continue;
        }
        match serde_json::from_value::<NormalizedRecord>(entry) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("Skipping snapshot entry {}: {}", index, e),
        }
    }

    Ok(Some(records))
}
