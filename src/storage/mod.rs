//! Storage module for browsing harvested audiobooks
//!
//! This module handles:
//! - SQLite database initialization and schema management
//! - Bulk insertion of audiobooks seeded from the JSON snapshot
//! - Ordered, offset-paginated reads for the listing

mod loader;
mod schema;
mod sqlite;
mod traits;

pub use loader::{parse_publish_date, seed_from_file, to_audio_book, SeedOutcome};
pub use sqlite::SqliteStore;
pub use traits::{Store, StorageError, StorageResult};

use chrono::{DateTime, Utc};

/// Books shown per listing page
pub const PAGE_SIZE: u32 = 50;

/// An audiobook as stored, without its generated key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioBook {
    pub title: String,
    pub subtitle: Option<String>,
    pub authors: Vec<String>,
    pub narrators: Vec<String>,
    pub publisher: Option<String>,
    pub publish_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub languages: Vec<String>,
    pub isbn: Option<String>,
    pub duration: Option<i64>,
    pub cover_url: Option<String>,
    pub sample_url: Option<String>,
    pub is_series: bool,
    pub series_id: Option<String>,
    pub series_name: Option<String>,
    pub reading_order: Option<i64>,
}

/// A stored audiobook with its primary key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAudioBook {
    pub id: i64,
    pub book: AudioBook,
}

/// One page of an ordered listing
#[derive(Debug, Clone)]
pub struct BookPage {
    pub items: Vec<StoredAudioBook>,
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
    /// Books in the whole store
    pub total: u64,
}

impl BookPage {
    /// Number of pages needed for all books (at least 1)
    pub fn pages(&self) -> u64 {
        if self.per_page == 0 || self.total == 0 {
            return 1;
        }
        self.total.div_ceil(u64::from(self.per_page))
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.pages()
    }

    pub fn prev_num(&self) -> Option<u32> {
        self.has_prev().then(|| self.page - 1)
    }

    pub fn next_num(&self) -> Option<u32> {
        self.has_next().then(|| self.page + 1)
    }
}
