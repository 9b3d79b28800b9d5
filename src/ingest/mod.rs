//! Ingestion module - harvesting the remote catalog
//!
//! This module handles:
//! - Building catalog page requests
//! - Fetching pages with bounded retries
//! - Extracting normalized records from raw catalog items
//! - Pacing requests with randomized politeness delays
//! - Coordinating the paged loop, checkpoints, and interrupts

mod catalog;
mod coordinator;
mod extract;
mod fetcher;
mod pacing;

pub use catalog::{parse_items, CatalogQuery, MalformedResponse, PAGE_SIZE, SORT_ORDER};
pub use coordinator::{
    run_ingest, shutdown_signal, IngestOutcome, IngestReport, Ingestor, CHECKPOINT_INTERVAL,
};
pub use extract::{
    extract_record, Extracted, Extraction, FieldDiagnostic, AUDIOBOOK_FORMATS, COVER_KEY,
};
pub use fetcher::{
    build_http_client, fetch_page, fetch_with_retry, FetchError, RetriesExhausted, MAX_ATTEMPTS,
};
pub use pacing::Pacer;
