//! Normalized audiobook records
//!
//! This module defines the flat record shape written to the JSON sink and
//! the string normalization applied to every text value in it.

mod lenient;
mod normalize;

pub use normalize::{normalize_all, normalize_text, parse_duration, strip_html};

use serde::{Deserialize, Serialize};

/// One catalog item, flattened and cleaned
///
/// Field names on the wire match the JSON sink consumed by the loader.
/// Reading is lenient per field: a value of an unexpected shape is dropped
/// and the rest of the record is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NormalizedRecord {
    #[serde(deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "lenient::text_list")]
    pub authors: Vec<String>,
    #[serde(deserialize_with = "lenient::text_list")]
    pub narrators: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub publisher: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub publish_date: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::text_list")]
    pub genres: Vec<String>,
    #[serde(deserialize_with = "lenient::text_list")]
    pub languages: Vec<String>,
    #[serde(rename = "ISBN", deserialize_with = "lenient::text")]
    pub isbn: Option<String>,
    #[serde(deserialize_with = "lenient::seconds")]
    pub duration: Option<i64>,
    #[serde(rename = "coverURL", deserialize_with = "lenient::text")]
    pub cover_url: Option<String>,
    #[serde(rename = "sampleURL", deserialize_with = "lenient::text")]
    pub sample_url: Option<String>,
    #[serde(deserialize_with = "lenient::series")]
    pub series: Option<SeriesInfo>,
}

/// Series membership of a record
///
/// Identifiers are kept as text whatever JSON type the catalog used, so a
/// numeric `seriesId` of `991` is written to the sink as `"991"`. The store
/// parses `readingOrder` back into a number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesInfo {
    #[serde(rename = "seriesID", deserialize_with = "lenient::text")]
    pub series_id: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub series_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub reading_order: Option<String>,
}

impl NormalizedRecord {
    /// Applies [`normalize_text`] to every string value in the record
    pub fn normalized(self) -> Self {
        let norm = |v: Option<String>| v.as_deref().map(normalize_text);

        Self {
            title: norm(self.title),
            subtitle: norm(self.subtitle),
            authors: normalize_all(self.authors),
            narrators: normalize_all(self.narrators),
            publisher: norm(self.publisher),
            publish_date: norm(self.publish_date),
            description: norm(self.description),
            genres: normalize_all(self.genres),
            languages: normalize_all(self.languages),
            isbn: norm(self.isbn),
            duration: self.duration,
            cover_url: norm(self.cover_url),
            sample_url: norm(self.sample_url),
            series: self.series.map(|s| SeriesInfo {
                series_id: norm(s.series_id),
                series_name: norm(s.series_name),
                reading_order: norm(s.reading_order),
            }),
        }
    }
}
