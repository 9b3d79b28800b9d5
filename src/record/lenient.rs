//! Field-by-field readers for snapshot records
//!
//! A snapshot may come from an older or hand-edited harvest. Each reader
//! here accepts whatever JSON shape a field holds and falls back to "no
//! value" instead of failing, so one odd field never costs the record.

use crate::record::{parse_duration, SeriesInfo};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Strings as-is, numbers and booleans rendered as text
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// A list of text values; non-scalar entries are skipped, a lone scalar
/// becomes a one-element list
pub(crate) fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    })
}

/// Whole seconds from a number or an `HH:MM:SS` / `MM:SS` / digits string
pub(crate) fn seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => parse_duration(&s),
        _ => None,
    })
}

pub(crate) fn series<'de, D>(deserializer: D) -> Result<Option<SeriesInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(mut map) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };

    let mut take = |key: &str| map.remove(key).and_then(scalar_text);
    Ok(Some(SeriesInfo {
        series_id: take("seriesID"),
        series_name: take("seriesName"),
        reading_order: take("readingOrder"),
    }))
}
