//! Seeding the store from the JSON snapshot
//!
//! The loader runs once before the listing is served. It only ever fills an
//! empty store, so running it again is harmless.

use crate::output::read_snapshot;
use crate::record::NormalizedRecord;
use crate::storage::{AudioBook, Store};
use crate::ShelfError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::path::Path;

/// Title stored for records that arrived without one
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// What a seeding attempt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store already held books; nothing was inserted
    AlreadyPopulated { existing: u64 },
    /// No snapshot exists; the store stays empty
    MissingSource,
    /// The snapshot was loaded
    Seeded { inserted: usize },
}

/// Parses the catalog's publish date into a UTC timestamp
///
/// Accepts RFC 3339 timestamps, offset-less ISO 8601 date-times (taken as
/// UTC) and plain dates (midnight UTC). Returns `None` for anything else.
pub fn parse_publish_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Converts a snapshot record into its stored form
pub fn to_audio_book(record: NormalizedRecord) -> AudioBook {
    let publish_date = record.publish_date.as_deref().and_then(|raw| {
        let parsed = parse_publish_date(raw);
        if parsed.is_none() {
            tracing::debug!("Unparseable publish date '{}', storing none", raw);
        }
        parsed
    });

    let series = record.series;
    let is_series = series.is_some();
    let (series_id, series_name, reading_order) = match series {
        Some(s) => (
            s.series_id,
            s.series_name,
            s.reading_order.and_then(|o| o.trim().parse::<i64>().ok()),
        ),
        None => (None, None, None),
    };

    AudioBook {
        title: record.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        subtitle: record.subtitle,
        authors: record.authors,
        narrators: record.narrators,
        publisher: record.publisher,
        publish_date,
        description: record.description,
        genres: record.genres,
        languages: record.languages,
        isbn: record.isbn,
        duration: record.duration,
        cover_url: record.cover_url,
        sample_url: record.sample_url,
        is_series,
        series_id,
        series_name,
        reading_order,
    }
}

/// Seeds an empty store from the snapshot at `path`
///
/// # Arguments
///
/// * `store` - The store to fill
/// * `path` - Path to the JSON snapshot written by the ingestor
///
/// # Returns
///
/// * `Ok(SeedOutcome)` - What was done; see [`SeedOutcome`]
/// * `Err(ShelfError)` - The snapshot was unreadable or the insert failed
pub fn seed_from_file(store: &mut dyn Store, path: &Path) -> Result<SeedOutcome, ShelfError> {
    let existing = store.count_books()?;
    if existing > 0 {
        tracing::debug!("Store already holds {} audiobooks, skipping seed", existing);
        return Ok(SeedOutcome::AlreadyPopulated { existing });
    }

    tracing::info!("Seeding database from {}...", path.display());

    let Some(records) = read_snapshot(path)? else {
        tracing::info!(
            "{} not found. Database initialized empty.",
            path.display()
        );
        return Ok(SeedOutcome::MissingSource);
    };

    let books: Vec<AudioBook> = records.into_iter().map(to_audio_book).collect();
    let inserted = if books.is_empty() {
        0
    } else {
        store.insert_books(&books)?
    };

    tracing::info!("Seeded {} audiobooks.", inserted);
    Ok(SeedOutcome::Seeded { inserted })
}
