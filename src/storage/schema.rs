//! Database schema definitions
//!
//! This module contains the SQL schema for the Audioshelf store.

/// SQL schema for the database
///
/// List-valued columns hold JSON arrays as text.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS audiobooks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    subtitle TEXT,
    authors TEXT NOT NULL DEFAULT '[]',
    narrators TEXT NOT NULL DEFAULT '[]',
    publisher TEXT,
    publish_date TEXT,
    description TEXT,
    genres TEXT NOT NULL DEFAULT '[]',
    languages TEXT NOT NULL DEFAULT '[]',
    isbn TEXT,
    duration INTEGER,
    cover_url TEXT,
    sample_url TEXT,
    is_series INTEGER NOT NULL DEFAULT 0,
    series_id TEXT,
    series_name TEXT,
    reading_order INTEGER
);

CREATE INDEX IF NOT EXISTS idx_audiobooks_series ON audiobooks(series_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
