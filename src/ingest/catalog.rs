//! Catalog request building and response decoding
//!
//! The catalog is a paged JSON endpoint:
//! `GET {base}/v2/libraries/{library}/media?...&page=N` returning an object
//! whose `items` array is empty once the listing is exhausted.

use crate::config::{CatalogConfig, IngestConfig};
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Items requested per page
pub const PAGE_SIZE: u32 = 100;

/// Sort order sent with every request
pub const SORT_ORDER: &str = "newlyadded";

/// Response body that could not be interpreted as a catalog page
#[derive(Debug, Error)]
pub enum MalformedResponse {
    #[error("body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("`items` is not an array")]
    ItemsNotAnArray,
}

/// Builds page URLs for one harvesting run
///
/// Everything except the page number is fixed when the run starts; `page`
/// is appended last on each request.
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    base: Url,
}

impl CatalogQuery {
    /// Creates the query for the configured library and filters
    ///
    /// # Arguments
    ///
    /// * `catalog` - Endpoint settings
    /// * `ingest` - Language and media type filters
    ///
    /// # Returns
    ///
    /// * `Ok(CatalogQuery)` - Query ready to produce page URLs
    /// * `Err(url::ParseError)` - The base URL or library produced an invalid URL
    pub fn new(catalog: &CatalogConfig, ingest: &IngestConfig) -> Result<Self, url::ParseError> {
        let root = catalog.base_url.trim_end_matches('/');
        let mut base = Url::parse(&format!(
            "{}/v2/libraries/{}/media",
            root, catalog.library
        ))?;

        let media_type = &ingest.media_type;
        base.query_pairs_mut()
            .append_pair("language", &ingest.languages.join(","))
            .append_pair("sortBy", SORT_ORDER)
            .append_pair("mediaTypes", media_type)
            .append_pair(
                "format",
                &format!("{0}-overdrive,{0}-overdrive-provisional", media_type),
            )
            .append_pair("includeFacets", "false")
            .append_pair("perPage", &PAGE_SIZE.to_string())
            .append_pair("truncateDescription", "false")
            .append_pair("x-client-id", &catalog.client_id);

        Ok(Self { base })
    }

    /// URL for a 1-based page number
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("page", &page.to_string());
        url
    }
}

/// Decodes a catalog response body into its raw items
///
/// A missing or `null` `items` key is treated as an empty page.
pub fn parse_items(body: &str) -> Result<Vec<Value>, MalformedResponse> {
    let value: Value = serde_json::from_str(body)?;

    let mut object = match value {
        Value::Object(map) => map,
        Value::Array(_) => return Err(MalformedResponse::NotAnObject("an array")),
        Value::String(_) => return Err(MalformedResponse::NotAnObject("a string")),
        Value::Number(_) => return Err(MalformedResponse::NotAnObject("a number")),
        Value::Bool(_) => return Err(MalformedResponse::NotAnObject("a boolean")),
        Value::Null => return Err(MalformedResponse::NotAnObject("null")),
    };

    match object.remove("items") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(MalformedResponse::ItemsNotAnArray),
    }
}
