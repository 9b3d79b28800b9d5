//! End-to-end harvesting runs against a mock catalog

use audioshelf::config::{CatalogConfig, Config, IngestConfig, OutputConfig, PacingConfig};
use audioshelf::ingest::{IngestOutcome, Ingestor, Pacer};
use audioshelf::output::read_snapshot;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MEDIA_PATH: &str = "/v2/libraries/testlib/media";

/// Creates a configuration pointing at the mock server, with no delays
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    Config {
        catalog: CatalogConfig {
            base_url: base_url.to_string(),
            library: "testlib".to_string(),
            client_id: "tester".to_string(),
            timeout_secs: 5,
        },
        ingest: IngestConfig {
            languages: vec!["de".to_string()],
            media_type: "audiobook".to_string(),
            debug: false,
        },
        pacing: PacingConfig {
            retry_delay_ms: 0,
            min_delay_ms: 0,
            max_delay_ms: 0,
            step_ms: 0,
        },
        output: OutputConfig {
            metadata_path: dir.join("books.json").to_string_lossy().into_owned(),
            debug_path: dir.join("debug_item.json").to_string_lossy().into_owned(),
            log_path: dir.join("scraper.log").to_string_lossy().into_owned(),
            database_path: dir.join("site.db").to_string_lossy().into_owned(),
        },
    }
}

fn item(title: &str) -> Value {
    json!({
        "title": title,
        "creators": [
            {"name": "Autorin", "role": "Author"},
            {"name": "Sprecher", "role": "Narrator"}
        ],
        "formats": [
            {"id": "audiobook-mp3", "isbn": "9783000000000", "duration": "01:00:00"}
        ],
        "covers": {"cover510Wide": {"href": "https://img.example/c.jpg"}}
    })
}

fn page_body(page: u32, count: u32) -> Value {
    let items: Vec<Value> = (1..=count)
        .map(|i| item(&format!("Seite {} Titel {}", page, i)))
        .collect();
    json!({ "items": items, "totalItems": 9999 })
}

async fn mount_page(server: &MockServer, page: u32, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path(MEDIA_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_items(server: &MockServer, page: u32, count: u32) {
    mount_page(
        server,
        page,
        ResponseTemplate::new(200).set_body_json(page_body(page, count)),
        1,
    )
    .await;
}

async fn run(config: &Config) -> audioshelf::IngestReport {
    let (_tx, rx) = watch::channel(false);
    let mut ingestor = Ingestor::new(config)
        .unwrap()
        .with_pacer(Pacer::with_seed(config.pacing.clone(), 1));
    ingestor.run(rx).await.unwrap()
}

fn snapshot_titles(config: &Config) -> Vec<String> {
    read_snapshot(Path::new(&config.output.metadata_path))
        .unwrap()
        .expect("snapshot should exist")
        .into_iter()
        .map(|r| r.title.unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn test_stops_after_first_empty_page() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_items(&mock_server, 1, 3).await;
    mount_items(&mock_server, 2, 2).await;
    mount_page(
        &mock_server,
        3,
        ResponseTemplate::new(200).set_body_json(json!({"items": []})),
        1,
    )
    .await;
    // Page 4 must never be requested
    mount_page(
        &mock_server,
        4,
        ResponseTemplate::new(200).set_body_json(page_body(4, 1)),
        0,
    )
    .await;

    let report = run(&config).await;

    assert_eq!(report.outcome, IngestOutcome::Exhausted);
    assert_eq!(report.pages_completed, 2);
    assert_eq!(report.records, 5);
    assert_eq!(report.output_path, Path::new(&config.output.metadata_path));

    let titles = snapshot_titles(&config);
    assert_eq!(
        titles,
        vec![
            "Seite 1 Titel 1",
            "Seite 1 Titel 2",
            "Seite 1 Titel 3",
            "Seite 2 Titel 1",
            "Seite 2 Titel 2",
        ]
    );
}

#[tokio::test]
async fn test_sends_catalog_query_parameters() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    Mock::given(method("GET"))
        .and(path(MEDIA_PATH))
        .and(query_param("page", "1"))
        .and(query_param("language", "de"))
        .and(query_param("sortBy", "newlyadded"))
        .and(query_param("mediaTypes", "audiobook"))
        .and(query_param(
            "format",
            "audiobook-overdrive,audiobook-overdrive-provisional",
        ))
        .and(query_param("includeFacets", "false"))
        .and(query_param("perPage", "100"))
        .and(query_param("truncateDescription", "false"))
        .and(query_param("x-client-id", "tester"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = run(&config).await;

    assert_eq!(report.outcome, IngestOutcome::Exhausted);
    assert_eq!(report.pages_completed, 0);
    assert!(snapshot_titles(&config).is_empty());
}

#[tokio::test]
async fn test_extracted_record_fields() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_items(&mock_server, 1, 1).await;
    mount_items(&mock_server, 2, 0).await;

    run(&config).await;

    let records = read_snapshot(Path::new(&config.output.metadata_path))
        .unwrap()
        .unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.authors, vec!["Autorin"]);
    assert_eq!(record.narrators, vec!["Sprecher"]);
    assert_eq!(record.isbn.as_deref(), Some("9783000000000"));
    assert_eq!(record.duration, Some(3600));
    assert_eq!(record.cover_url.as_deref(), Some("https://img.example/c.jpg"));

    // Wire names in the file itself
    let raw: Value =
        serde_json::from_str(&std::fs::read_to_string(&config.output.metadata_path).unwrap())
            .unwrap();
    assert!(raw[0].get("ISBN").is_some());
    assert!(raw[0].get("coverURL").is_some());
    assert!(raw[0].get("publishDate").is_some());
}

#[tokio::test]
async fn test_checkpoint_after_fifth_page() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    for page in 1..=5 {
        mount_items(&mock_server, page, 2).await;
    }
    // Hold page 6 back so the checkpoint can be read mid-run
    mount_page(
        &mock_server,
        6,
        ResponseTemplate::new(200)
            .set_body_json(page_body(6, 2))
            .set_delay(Duration::from_millis(1500)),
        1,
    )
    .await;
    mount_items(&mock_server, 7, 0).await;

    let (_tx, rx) = watch::channel(false);
    let mut ingestor = Ingestor::new(&config).unwrap();
    let handle = tokio::spawn(async move { ingestor.run(rx).await });

    let snapshot_path = Path::new(&config.output.metadata_path).to_path_buf();
    let mut waited = Duration::ZERO;
    while !snapshot_path.exists() {
        assert!(waited < Duration::from_secs(10), "no checkpoint was written");
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += Duration::from_millis(20);
    }

    let checkpoint = snapshot_titles(&config);
    assert_eq!(checkpoint.len(), 10);
    assert_eq!(checkpoint.last().map(String::as_str), Some("Seite 5 Titel 2"));

    let report = handle.await.unwrap().unwrap();
    assert_eq!(report.outcome, IngestOutcome::Exhausted);
    assert_eq!(report.pages_completed, 6);
    assert_eq!(snapshot_titles(&config).len(), 12);
}

#[tokio::test]
async fn test_retry_exhaustion_on_first_page() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.ingest.debug = true;

    mount_page(&mock_server, 1, ResponseTemplate::new(503), 3).await;

    let report = run(&config).await;

    assert_eq!(report.outcome, IngestOutcome::RetriesExhausted { page: 1 });
    assert!(report.outcome.is_fatal());
    assert_eq!(report.records, 0);

    let content = std::fs::read_to_string(&config.output.metadata_path).unwrap();
    assert_eq!(content.trim(), "[]");
    // Debug sink is opened lazily, so no item means no file
    assert!(!Path::new(&config.output.debug_path).exists());
}

#[tokio::test]
async fn test_retry_recovers_within_attempt_budget() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    // Two failures, then the mock below takes over
    Mock::given(method("GET"))
        .and(path(MEDIA_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_items(&mock_server, 1, 1).await;
    mount_items(&mock_server, 2, 0).await;

    let report = run(&config).await;

    assert_eq!(report.outcome, IngestOutcome::Exhausted);
    assert_eq!(report.records, 1);
}

#[tokio::test]
async fn test_failure_after_progress_keeps_earlier_pages() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_items(&mock_server, 1, 2).await;
    mount_items(&mock_server, 2, 2).await;
    mount_page(&mock_server, 3, ResponseTemplate::new(500), 3).await;

    let report = run(&config).await;

    assert_eq!(report.outcome, IngestOutcome::RetriesExhausted { page: 3 });
    assert_eq!(report.pages_completed, 2);
    assert_eq!(snapshot_titles(&config).len(), 4);
}

#[tokio::test]
async fn test_malformed_body_is_fatal_without_retry() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_items(&mock_server, 1, 1).await;
    mount_page(
        &mock_server,
        2,
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
        1,
    )
    .await;

    let report = run(&config).await;

    assert_eq!(report.outcome, IngestOutcome::MalformedResponse { page: 2 });
    assert!(report.outcome.is_fatal());
    assert_eq!(snapshot_titles(&config), vec!["Seite 1 Titel 1"]);
}

#[tokio::test]
async fn test_broken_field_does_not_drop_item() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let body = json!({
        "items": [
            {"title": "Ohne Cover", "covers": {"cover150Wide": {"href": "x"}}},
            {"title": "Kaputte Formate", "formats": "not-a-list"},
            "not an object"
        ]
    });
    mount_page(
        &mock_server,
        1,
        ResponseTemplate::new(200).set_body_json(body),
        1,
    )
    .await;
    mount_items(&mock_server, 2, 0).await;

    let report = run(&config).await;

    assert_eq!(report.records, 3);
    assert!(report.field_diagnostics >= 3);

    let records = read_snapshot(Path::new(&config.output.metadata_path))
        .unwrap()
        .unwrap();
    assert_eq!(records[0].title.as_deref(), Some("Ohne Cover"));
    assert_eq!(records[0].cover_url, None);
    assert_eq!(records[1].isbn, None);
    assert_eq!(records[2].title, None);
}

#[tokio::test]
async fn test_debug_mode_appends_raw_items() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.ingest.debug = true;

    std::fs::write(&config.output.debug_path, "{\"earlier\":true}\n").unwrap();

    mount_items(&mock_server, 1, 2).await;
    mount_items(&mock_server, 2, 0).await;

    let report = run(&config).await;
    assert_eq!(report.debug_items, 2);

    let content = std::fs::read_to_string(&config.output.debug_path).unwrap();
    let lines: Vec<Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], json!({"earlier": true}));
    assert_eq!(lines[1], item("Seite 1 Titel 1"));
    assert_eq!(lines[2], item("Seite 1 Titel 2"));
}

#[tokio::test]
async fn test_interrupt_during_pause_stops_run() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.pacing.min_delay_ms = 30_000;
    config.pacing.max_delay_ms = 30_000;

    mount_items(&mock_server, 1, 2).await;
    mount_page(
        &mock_server,
        2,
        ResponseTemplate::new(200).set_body_json(page_body(2, 1)),
        0,
    )
    .await;

    let (tx, rx) = watch::channel(false);
    let mut ingestor = Ingestor::new(&config).unwrap();
    let handle = tokio::spawn(async move { ingestor.run(rx).await });

    tokio::time::sleep(Duration::from_millis(300)).await;
    tx.send(true).unwrap();

    let report = tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .expect("run should stop promptly")
        .unwrap()
        .unwrap();

    assert_eq!(report.outcome, IngestOutcome::Interrupted);
    assert!(!report.outcome.is_fatal());
    assert_eq!(report.pages_completed, 1);
    assert_eq!(snapshot_titles(&config).len(), 2);
}

#[tokio::test]
async fn test_run_log_records_progress_and_checkpoint() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());
    std::fs::write(&config.output.log_path, "stale line\n").unwrap();

    for page in 1..=5 {
        mount_items(&mock_server, page, 2).await;
    }
    mount_items(&mock_server, 6, 0).await;

    // Quiet console; the run log still gets info lines
    let (subscriber, log_guard) =
        audioshelf::logging::run_subscriber(0, true, Path::new(&config.output.log_path)).unwrap();
    let default_guard = tracing::subscriber::set_default(subscriber);
    let report = run(&config).await;
    drop(default_guard);
    drop(log_guard);

    assert_eq!(report.records, 10);

    let log = std::fs::read_to_string(&config.output.log_path).unwrap();
    assert!(!log.contains("stale line"));
    assert!(log.contains("Starting scraping..."));
    assert!(log.contains("Fetching page 1..."));
    assert!(log.contains("Fetching page 6..."));
    assert!(log.contains("Saved intermediate results (10 items)."));
    assert!(log.contains("No more items found. Finished."));
    assert!(log.contains("Total items extracted: 10"));
}
