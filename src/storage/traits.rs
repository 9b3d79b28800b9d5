//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{AudioBook, BookPage, StoredAudioBook};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid page number: {0} (pages start at 1)")]
    InvalidPage(u32),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for audiobook store implementations
///
/// Books are inserted once and read many times; there is no update or
/// delete path.
pub trait Store {
    /// Counts all stored books
    fn count_books(&self) -> StorageResult<u64>;

    /// Inserts `books` in one transaction
    ///
    /// Either every book is stored or none is.
    ///
    /// # Returns
    ///
    /// The number of rows inserted
    fn insert_books(&mut self, books: &[AudioBook]) -> StorageResult<usize>;

    /// Gets a book by ID
    fn get_book(&self, id: i64) -> StorageResult<Option<StoredAudioBook>>;

    /// Lists books ordered by ID
    ///
    /// # Arguments
    ///
    /// * `offset` - Number of books to skip
    /// * `limit` - Maximum number of books to return
    fn list_books(&self, offset: u64, limit: u64) -> StorageResult<Vec<StoredAudioBook>>;

    /// Gets one page of books ordered by ID
    ///
    /// Pages start at 1. A page past the end is returned empty, with the
    /// totals still filled in.
    fn page(&self, page: u32, per_page: u32) -> StorageResult<BookPage> {
        if page == 0 {
            return Err(StorageError::InvalidPage(page));
        }

        let total = self.count_books()?;
        let offset = u64::from(page - 1) * u64::from(per_page);
        let items = self.list_books(offset, u64::from(per_page))?;

        Ok(BookPage {
            items,
            page,
            per_page,
            total,
        })
    }
}
