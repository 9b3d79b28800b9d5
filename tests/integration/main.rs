//! Integration tests for Audioshelf
//!
//! The ingestion tests run the full harvesting loop against a wiremock
//! catalog; the seeding tests load snapshots into a SQLite file.

mod ingest_tests;
mod seed_tests;
