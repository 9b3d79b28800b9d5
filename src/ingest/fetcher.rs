//! HTTP fetcher for catalog pages
//!
//! This module handles all HTTP requests made by the ingestor:
//! - Building the HTTP client with timeouts and a user agent
//! - GET requests for a single catalog page
//! - Retry logic for failed attempts
//! - Error classification

use crate::config::CatalogConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Attempts made per page before the run is abandoned
pub const MAX_ATTEMPTS: u32 = 3;

/// A single failed attempt at fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// The catalog answered with a non-success status
    #[error("failed with status {status}")]
    Status { status: u16 },

    /// The request timed out
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other transport-level failure
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body could not be read
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else if e.is_body() || e.is_decode() {
            FetchError::Body(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Every attempt at a page failed
#[derive(Debug, Error)]
#[error("giving up after {attempts} attempts: {last}")]
pub struct RetriesExhausted {
    /// Number of attempts made
    pub attempts: u32,
    /// The failure of the final attempt
    pub last: FetchError,
}

/// Builds an HTTP client for the catalog
///
/// # Arguments
///
/// * `config` - The catalog endpoint configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CatalogConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!("audioshelf/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Makes one attempt at a page and returns its body
///
/// Only a 2xx status counts as success; the body is read in full before
/// returning so a truncated transfer is reported as a failed attempt.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<String, FetchError> {
    let response = client.get(url.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| FetchError::Body(e.to_string()))
}

/// Fetches a page, retrying failed attempts
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | 2xx | Return body |
/// | Other HTTP status | Wait `retry_delay`, retry |
/// | Timeout / connection / transport error | Wait `retry_delay`, retry |
/// | Body read failure | Wait `retry_delay`, retry |
///
/// At most `max_attempts` requests are sent. No pause follows the last one.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The page URL
/// * `max_attempts` - Upper bound on requests sent
/// * `retry_delay` - Fixed pause between attempts
pub async fn fetch_with_retry(
    client: &Client,
    url: &Url,
    max_attempts: u32,
    retry_delay: Duration,
) -> Result<String, RetriesExhausted> {
    let mut attempt = 1;

    loop {
        match fetch_page(client, url).await {
            Ok(body) => return Ok(body),
            Err(e) => {
                match &e {
                    FetchError::Status { status } => {
                        tracing::warn!("  Attempt {} failed with status {}", attempt, status)
                    }
                    other => tracing::warn!("  Attempt {} error: {}", attempt, other),
                }

                if attempt >= max_attempts {
                    return Err(RetriesExhausted {
                        attempts: attempt,
                        last: e,
                    });
                }

                tokio::time::sleep(retry_delay).await;
                attempt += 1;
            }
        }
    }
}
