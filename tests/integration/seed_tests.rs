//! Seeding a file-backed store from a snapshot and paging through it

use audioshelf::output::{render_listing, SnapshotWriter};
use audioshelf::record::{NormalizedRecord, SeriesInfo};
use audioshelf::storage::{seed_from_file, SeedOutcome, SqliteStore, Store, PAGE_SIZE};
use tempfile::TempDir;

fn record(i: usize) -> NormalizedRecord {
    NormalizedRecord {
        title: Some(format!("Hörbuch {}", i)),
        authors: vec!["Autorin".to_string()],
        narrators: vec!["Sprecher".to_string()],
        duration: Some(3600 + i as i64),
        publish_date: Some("2022-05-01T00:00:00Z".to_string()),
        series: (i % 2 == 0).then(|| SeriesInfo {
            series_id: Some("12".to_string()),
            series_name: Some("Reihe".to_string()),
            reading_order: Some(i.to_string()),
        }),
        ..Default::default()
    }
}

#[test]
fn test_seed_snapshot_then_browse_pages() {
    let dir = TempDir::new().unwrap();
    let snapshot_path = dir.path().join("audiobook_metadata.json");
    let db_path = dir.path().join("instance").join("site.db");

    let records: Vec<NormalizedRecord> = (1..=120).map(record).collect();
    SnapshotWriter::new(&snapshot_path).write(&records).unwrap();

    let mut store = SqliteStore::new(&db_path).unwrap();
    let outcome = seed_from_file(&mut store, &snapshot_path).unwrap();
    assert_eq!(outcome, SeedOutcome::Seeded { inserted: 120 });

    let first = store.page(1, PAGE_SIZE).unwrap();
    assert_eq!(first.items.len(), 50);
    assert_eq!(first.pages(), 3);
    assert_eq!(first.items[0].book.title, "Hörbuch 1");
    assert!(!first.items[0].book.is_series);
    assert!(first.items[1].book.is_series);
    assert_eq!(first.items[1].book.reading_order, Some(2));

    let third = store.page(3, PAGE_SIZE).unwrap();
    assert_eq!(third.items.len(), 20);
    assert_eq!(third.items[19].book.title, "Hörbuch 120");

    let listing = render_listing(&third);
    assert!(listing.contains("Hörbuch 101"));
    assert!(listing.contains("previous: `--browse 2`"));
    assert!(!listing.contains("next:"));
}

#[test]
fn test_reseeding_a_populated_file_store_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let snapshot_path = dir.path().join("audiobook_metadata.json");
    let db_path = dir.path().join("site.db");

    SnapshotWriter::new(&snapshot_path)
        .write(&[record(1), record(2)])
        .unwrap();

    {
        let mut store = SqliteStore::new(&db_path).unwrap();
        seed_from_file(&mut store, &snapshot_path).unwrap();
    }

    // A later, larger snapshot is ignored once the store holds books
    let bigger: Vec<NormalizedRecord> = (1..=10).map(record).collect();
    SnapshotWriter::new(&snapshot_path).write(&bigger).unwrap();

    let mut store = SqliteStore::new(&db_path).unwrap();
    let outcome = seed_from_file(&mut store, &snapshot_path).unwrap();

    assert_eq!(outcome, SeedOutcome::AlreadyPopulated { existing: 2 });
    assert_eq!(store.count_books().unwrap(), 2);
}

#[test]
fn test_missing_snapshot_leaves_empty_listing() {
    let dir = TempDir::new().unwrap();
    let mut store = SqliteStore::new(&dir.path().join("site.db")).unwrap();

    let outcome = seed_from_file(&mut store, &dir.path().join("absent.json")).unwrap();
    assert_eq!(outcome, SeedOutcome::MissingSource);

    let page = store.page(1, PAGE_SIZE).unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.pages(), 1);
}

#[test]
fn test_malformed_snapshot_is_an_error() {
    let dir = TempDir::new().unwrap();
    let snapshot_path = dir.path().join("audiobook_metadata.json");
    std::fs::write(&snapshot_path, "{\"not\": \"an array\"}").unwrap();

    let mut store = SqliteStore::new(&dir.path().join("site.db")).unwrap();

    assert!(seed_from_file(&mut store, &snapshot_path).is_err());
    assert_eq!(store.count_books().unwrap(), 0);
}
