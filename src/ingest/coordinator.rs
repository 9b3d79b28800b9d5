//! Ingestion coordinator - the paged harvesting loop
//!
//! This module contains the loop that drives a harvesting run:
//! - Requesting catalog pages one at a time, with retries
//! - Extracting a normalized record from every item
//! - Writing periodic checkpoints of everything harvested so far
//! - Pausing politely between pages
//! - Stopping on exhaustion, fatal failure, or operator interrupt
//!
//! However the loop ends, the accumulated records are written out once more.

use crate::config::Config;
use crate::ingest::catalog::{parse_items, CatalogQuery};
use crate::ingest::extract::extract_record;
use crate::ingest::fetcher::{build_http_client, fetch_with_retry, MAX_ATTEMPTS};
use crate::ingest::pacing::Pacer;
use crate::output::{DebugSink, SnapshotWriter};
use crate::record::NormalizedRecord;
use crate::ShelfError;
use reqwest::Client;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;

/// Completed pages between two checkpoints
pub const CHECKPOINT_INTERVAL: u32 = 5;

/// How a harvesting run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The catalog returned an empty page
    Exhausted,
    /// The operator asked the run to stop
    Interrupted,
    /// Every attempt at `page` failed
    RetriesExhausted { page: u32 },
    /// The body for `page` was not a catalog page
    MalformedResponse { page: u32 },
}

impl IngestOutcome {
    /// Whether the run ended because of a failure
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IngestOutcome::RetriesExhausted { .. } | IngestOutcome::MalformedResponse { .. }
        )
    }
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub outcome: IngestOutcome,
    /// Pages whose items were all processed
    pub pages_completed: u32,
    /// Records in the final snapshot
    pub records: usize,
    /// Field extraction problems logged during the run
    pub field_diagnostics: usize,
    /// Raw items appended to the debug sink
    pub debug_items: u64,
    /// Where the final snapshot was written
    pub output_path: PathBuf,
}

/// Drives one harvesting run against the catalog
pub struct Ingestor {
    client: Client,
    query: CatalogQuery,
    pacer: Pacer,
    snapshot: SnapshotWriter,
    debug_sink: Option<DebugSink>,
    records: Vec<NormalizedRecord>,
    field_diagnostics: usize,
}

impl Ingestor {
    /// Creates an ingestor for a validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Ingestor)` - Ready to run
    /// * `Err(ShelfError)` - The HTTP client or the catalog URL could not be built
    pub fn new(config: &Config) -> Result<Self, ShelfError> {
        let client = build_http_client(&config.catalog)?;
        let query = CatalogQuery::new(&config.catalog, &config.ingest)?;
        let debug_sink = config
            .ingest
            .debug
            .then(|| DebugSink::new(&config.output.debug_path));

        Ok(Self {
            client,
            query,
            pacer: Pacer::new(config.pacing.clone()),
            snapshot: SnapshotWriter::new(&config.output.metadata_path),
            debug_sink,
            records: Vec::new(),
            field_diagnostics: 0,
        })
    }

    /// Replaces the pacer, e.g. with a seeded one
    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// Runs the harvesting loop until it ends, then writes the final snapshot
    ///
    /// `shutdown` flipping to `true` stops the run at the next page boundary.
    /// Fatal fetch or response failures are reported through
    /// [`IngestReport::outcome`], not as an error; an error is returned only
    /// when the final snapshot cannot be written.
    pub async fn run(
        &mut self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<IngestReport, ShelfError> {
        self.records.clear();
        self.field_diagnostics = 0;

        tracing::info!("Starting scraping...");

        let (outcome, pages_completed) = self.harvest(&mut shutdown).await;

        if outcome == IngestOutcome::Interrupted {
            tracing::info!("Stopping early...");
        }

        tracing::info!("Total items extracted: {}", self.records.len());
        self.snapshot.write(&self.records)?;
        tracing::info!("Saved to {}", self.snapshot.path().display());

        Ok(IngestReport {
            outcome,
            pages_completed,
            records: self.records.len(),
            field_diagnostics: self.field_diagnostics,
            debug_items: self.debug_sink.as_ref().map(DebugSink::written).unwrap_or(0),
            output_path: self.snapshot.path().to_path_buf(),
        })
    }

    /// The page loop; returns how it ended and how many pages completed
    async fn harvest(&mut self, shutdown: &mut watch::Receiver<bool>) -> (IngestOutcome, u32) {
        let mut page: u32 = 1;
        let mut pages_completed: u32 = 0;

        loop {
            if *shutdown.borrow() {
                return (IngestOutcome::Interrupted, pages_completed);
            }

            tracing::info!("Fetching page {}...", page);
            let url = self.query.page_url(page);

            let body = match fetch_with_retry(
                &self.client,
                &url,
                MAX_ATTEMPTS,
                self.pacer.retry_delay(),
            )
            .await
            {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!("  Max retries reached. Stopping. ({})", e.last);
                    return (IngestOutcome::RetriesExhausted { page }, pages_completed);
                }
            };

            let items = match parse_items(&body) {
                Ok(items) => items,
                Err(e) => {
                    tracing::error!("  Failed to parse JSON: {}", e);
                    return (IngestOutcome::MalformedResponse { page }, pages_completed);
                }
            };

            if items.is_empty() {
                tracing::info!("  No more items found. Finished.");
                return (IngestOutcome::Exhausted, pages_completed);
            }

            tracing::info!("  Found {} items.", items.len());
            self.ingest_items(&items);

            page += 1;
            pages_completed += 1;

            if pages_completed % CHECKPOINT_INTERVAL == 0 {
                self.checkpoint();
            }

            let delay = self.pacer.politeness_delay();
            tracing::debug!("Sleeping {:?} before the next page", delay);
            if pause(delay, shutdown).await {
                return (IngestOutcome::Interrupted, pages_completed);
            }
        }
    }

    /// Captures and extracts every item of one page
    fn ingest_items(&mut self, items: &[Value]) {
        for item in items {
            if let Some(sink) = self.debug_sink.as_mut() {
                if let Err(e) = sink.append(item) {
                    tracing::warn!(
                        "Failed to append item to {}: {}",
                        sink.path().display(),
                        e
                    );
                }
            }

            let extraction = extract_record(item);
            for diagnostic in &extraction.diagnostics {
                let title = extraction.record.title.as_deref().unwrap_or("<untitled>");
                tracing::warn!("Error extracting {} for '{}'", diagnostic, title);
            }
            self.field_diagnostics += extraction.diagnostics.len();
            self.records.push(extraction.record);
        }
    }

    /// Overwrites the snapshot with everything harvested so far
    ///
    /// A failed checkpoint is logged and the run continues; the final
    /// snapshot is attempted regardless.
    fn checkpoint(&self) {
        match self.snapshot.write(&self.records) {
            Ok(()) => tracing::info!(
                "  Saved intermediate results ({} items).",
                self.records.len()
            ),
            Err(e) => tracing::warn!("  Failed to save intermediate results: {}", e),
        }
    }
}

/// Sleeps for `duration` unless a shutdown is requested first
///
/// Returns `true` when the sleep was cut short by a shutdown request. If
/// the shutdown sender is gone, the full duration is slept.
async fn pause(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let sleep = tokio::time::sleep(duration);
    tokio::pin!(sleep);

    tokio::select! {
        _ = &mut sleep => false,
        stopped = async { shutdown.wait_for(|stop| *stop).await.is_ok() } => {
            if !stopped {
                sleep.await;
            }
            stopped
        }
    }
}

/// Waits for Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, finishing current page..."),
        _ = terminate => tracing::info!("Received SIGTERM, finishing current page..."),
    }
}

/// Runs a complete harvesting run, stopping gracefully on Ctrl-C
///
/// # Example
///
/// ```no_run
/// use audioshelf::config::Config;
/// use audioshelf::ingest::run_ingest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_ingest(&Config::default()).await?;
/// println!("{} records", report.records);
/// # Ok(())
/// # }
/// ```
pub async fn run_ingest(config: &Config) -> Result<IngestReport, ShelfError> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = tx.send(true);
    });

    let mut ingestor = Ingestor::new(config)?;
    ingestor.run(rx).await
}
