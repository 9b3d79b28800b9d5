use serde::Deserialize;

/// Main configuration structure for Audioshelf
///
/// Every table is optional in the TOML file; missing tables and keys fall
/// back to the values the catalog harvester has always used.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub ingest: IngestConfig,
    pub pacing: PacingConfig,
    pub output: OutputConfig,
}

/// Remote catalog endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Scheme and host of the catalog API
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Library identifier inserted into the media path
    pub library: String,

    /// Value sent as the `x-client-id` query parameter
    #[serde(rename = "client-id")]
    pub client_id: String,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://thunder.api.overdrive.com".to_string(),
            library: "voebb".to_string(),
            client_id: "dewey".to_string(),
            timeout_secs: 30,
        }
    }
}

/// What to harvest
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Language codes passed through as the `language` filter
    pub languages: Vec<String>,

    /// Media type filter, also used to derive the format identifiers
    #[serde(rename = "media-type")]
    pub media_type: String,

    /// Append every raw catalog item to the debug sink
    pub debug: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            languages: vec!["de".to_string(), "en".to_string()],
            media_type: "audiobook".to_string(),
            debug: false,
        }
    }
}

/// Delays between requests (milliseconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pause before retrying a failed page request
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Lower bound of the politeness delay between pages
    #[serde(rename = "min-delay-ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the politeness delay between pages
    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,

    /// Granularity of the politeness delay
    #[serde(rename = "step-ms")]
    pub step_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: 2000,
            min_delay_ms: 500,
            max_delay_ms: 5000,
            step_ms: 500,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JSON snapshot of all harvested records
    #[serde(rename = "metadata-path")]
    pub metadata_path: String,

    /// Newline-delimited raw items, written only in debug mode
    #[serde(rename = "debug-path")]
    pub debug_path: String,

    /// Plain-text run log mirroring console output
    #[serde(rename = "log-path")]
    pub log_path: String,

    /// SQLite database seeded from the snapshot
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            metadata_path: "audiobook_metadata.json".to_string(),
            debug_path: "debug_item.json".to_string(),
            log_path: "scraper.log".to_string(),
            database_path: "instance/site.db".to_string(),
        }
    }
}
