//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Store trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Store, StorageResult};
use crate::storage::{AudioBook, StoredAudioBook};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs;
use std::path::Path;

const BOOK_COLUMNS: &str = "id, title, subtitle, authors, narrators, publisher, publish_date,
     description, genres, languages, isbn, duration, cover_url, sample_url,
     is_series, series_id, series_name, reading_order";

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database at `path`
    ///
    /// Missing parent directories are created.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn json_list(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<StoredAudioBook> {
    let publish_date: Option<String> = row.get(6)?;

    Ok(StoredAudioBook {
        id: row.get(0)?,
        book: AudioBook {
            title: row.get(1)?,
            subtitle: row.get(2)?,
            authors: json_list(row, 3)?,
            narrators: json_list(row, 4)?,
            publisher: row.get(5)?,
            publish_date: publish_date.and_then(|d| d.parse::<DateTime<Utc>>().ok()),
            description: row.get(7)?,
            genres: json_list(row, 8)?,
            languages: json_list(row, 9)?,
            isbn: row.get(10)?,
            duration: row.get(11)?,
            cover_url: row.get(12)?,
            sample_url: row.get(13)?,
            is_series: row.get::<_, i64>(14)? != 0,
            series_id: row.get(15)?,
            series_name: row.get(16)?,
            reading_order: row.get(17)?,
        },
    })
}

impl Store for SqliteStore {
    fn count_books(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM audiobooks", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn insert_books(&mut self, books: &[AudioBook]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO audiobooks (title, subtitle, authors, narrators, publisher,
                 publish_date, description, genres, languages, isbn, duration, cover_url,
                 sample_url, is_series, series_id, series_name, reading_order)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            )?;

            for book in books {
                stmt.execute(params![
                    book.title,
                    book.subtitle,
                    serde_json::to_string(&book.authors)?,
                    serde_json::to_string(&book.narrators)?,
                    book.publisher,
                    book.publish_date.map(|d| d.to_rfc3339()),
                    book.description,
                    serde_json::to_string(&book.genres)?,
                    serde_json::to_string(&book.languages)?,
                    book.isbn,
                    book.duration,
                    book.cover_url,
                    book.sample_url,
                    book.is_series,
                    book.series_id,
                    book.series_name,
                    book.reading_order,
                ])?;
            }
        }
        tx.commit()?;

        Ok(books.len())
    }

    fn get_book(&self, id: i64) -> StorageResult<Option<StoredAudioBook>> {
        let book = self
            .conn
            .query_row(
                &format!("SELECT {} FROM audiobooks WHERE id = ?1", BOOK_COLUMNS),
                params![id],
                book_from_row,
            )
            .optional()?;

        Ok(book)
    }

    fn list_books(&self, offset: u64, limit: u64) -> StorageResult<Vec<StoredAudioBook>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM audiobooks ORDER BY id ASC LIMIT ?1 OFFSET ?2",
            BOOK_COLUMNS
        ))?;

        let books = stmt
            .query_map(params![limit as i64, offset as i64], book_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(books)
    }
}
