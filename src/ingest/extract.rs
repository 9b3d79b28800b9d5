//! Field extraction from raw catalog items
//!
//! Every field of a [`NormalizedRecord`] is pulled out by its own helper.
//! Missing data simply yields `None` or an empty list; data that is present
//! but has an unexpected shape also yields `None`, together with a
//! [`FieldDiagnostic`] the caller logs. No failure in one field affects the
//! others.

use crate::record::{parse_duration, strip_html, NormalizedRecord, SeriesInfo};
use serde_json::{Map, Value};
use std::fmt;

/// Format identifiers whose `duration` is taken as the audiobook length
pub const AUDIOBOOK_FORMATS: &[&str] = &[
    "audiobook-mp3",
    "audiobook-overdrive",
    "audiobook-overdrive-provisional",
];

/// Key under `covers` holding the cover image used for records
pub const COVER_KEY: &str = "cover510Wide";

/// Why a field came out empty even though the item carried data for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiagnostic {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of extracting one field: a value, a diagnostic, or neither
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted<T> {
    pub value: Option<T>,
    pub diagnostic: Option<FieldDiagnostic>,
}

impl<T> Extracted<T> {
    fn found(value: Option<T>) -> Self {
        Self {
            value,
            diagnostic: None,
        }
    }

    fn absent() -> Self {
        Self::found(None)
    }

    fn failed(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            value: None,
            diagnostic: Some(FieldDiagnostic {
                field,
                message: message.into(),
            }),
        }
    }

    /// Takes the value, moving any diagnostic into `diagnostics`
    pub fn collect(self, diagnostics: &mut Vec<FieldDiagnostic>) -> Option<T> {
        if let Some(d) = self.diagnostic {
            diagnostics.push(d);
        }
        self.value
    }
}

/// A record together with the diagnostics raised while building it
#[derive(Debug, Clone)]
pub struct Extraction {
    pub record: NormalizedRecord,
    pub diagnostics: Vec<FieldDiagnostic>,
}

/// Builds a normalized record from one raw catalog item
///
/// Never fails: an item that is not even a JSON object produces an empty
/// record and a single diagnostic.
pub fn extract_record(item: &Value) -> Extraction {
    let mut diagnostics = Vec::new();

    let Some(item) = item.as_object() else {
        diagnostics.push(FieldDiagnostic {
            field: "item",
            message: format!("expected an object, got {}", kind(item)),
        });
        return Extraction {
            record: NormalizedRecord::default(),
            diagnostics,
        };
    };

    let d = &mut diagnostics;
    let record = NormalizedRecord {
        title: string_field(item, "title").collect(d),
        subtitle: string_field(item, "subtitle").collect(d),
        authors: creators_with_role(item, "Author").collect(d).unwrap_or_default(),
        narrators: creators_with_role(item, "Narrator")
            .collect(d)
            .unwrap_or_default(),
        publisher: nested_string(item, "publisher", "name").collect(d),
        publish_date: string_field(item, "publishDate").collect(d),
        description: description(item).collect(d),
        genres: names(item, "subjects").collect(d).unwrap_or_default(),
        languages: names(item, "languages").collect(d).unwrap_or_default(),
        isbn: isbn(item).collect(d),
        duration: duration(item).collect(d),
        cover_url: cover_url(item).collect(d),
        sample_url: nested_string(item, "sample", "href").collect(d),
        series: series(item).collect(d),
    }
    .normalized();

    Extraction {
        record,
        diagnostics,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A top-level string; `null` and absence both mean no value
fn string_field(item: &Map<String, Value>, key: &'static str) -> Extracted<String> {
    match item.get(key) {
        None | Some(Value::Null) => Extracted::absent(),
        Some(Value::String(s)) => Extracted::found(Some(s.clone())),
        Some(other) => Extracted::failed(key, format!("expected a string, got {}", kind(other))),
    }
}

/// A string or number rendered as a string, for identifiers
fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// `item[outer][inner]` as a string
fn nested_string(
    item: &Map<String, Value>,
    outer: &'static str,
    inner: &str,
) -> Extracted<String> {
    match item.get(outer) {
        None | Some(Value::Null) => Extracted::absent(),
        Some(Value::Object(map)) => Extracted::found(scalar_string(map.get(inner))),
        Some(other) => {
            Extracted::failed(outer, format!("expected an object, got {}", kind(other)))
        }
    }
}

/// The objects of a list-valued key; absence yields an empty list
fn object_list<'a>(
    item: &'a Map<String, Value>,
    key: &'static str,
) -> Result<Vec<&'a Map<String, Value>>, FieldDiagnostic> {
    match item.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => Ok(entries.iter().filter_map(Value::as_object).collect()),
        Some(other) => Err(FieldDiagnostic {
            field: key,
            message: format!("expected an array, got {}", kind(other)),
        }),
    }
}

/// `name` of every entry in a list such as `subjects` or `languages`
fn names(item: &Map<String, Value>, key: &'static str) -> Extracted<Vec<String>> {
    match object_list(item, key) {
        Ok(entries) => Extracted::found(Some(
            entries
                .into_iter()
                .filter_map(|e| scalar_string(e.get("name")))
                .collect(),
        )),
        Err(d) => Extracted {
            value: None,
            diagnostic: Some(d),
        },
    }
}

/// Names of the creators tagged with `role`, in source order
fn creators_with_role(item: &Map<String, Value>, role: &str) -> Extracted<Vec<String>> {
    match object_list(item, "creators") {
        Ok(creators) => Extracted::found(Some(
            creators
                .into_iter()
                .filter(|c| c.get("role").and_then(Value::as_str) == Some(role))
                .filter_map(|c| scalar_string(c.get("name")))
                .collect(),
        )),
        Err(d) => Extracted {
            value: None,
            diagnostic: Some(d),
        },
    }
}

fn description(item: &Map<String, Value>) -> Extracted<String> {
    let extracted = string_field(item, "description");
    Extracted {
        value: extracted.value.map(|d| strip_html(&d)),
        diagnostic: extracted.diagnostic,
    }
}

fn formats(item: &Map<String, Value>) -> Result<Vec<&Map<String, Value>>, FieldDiagnostic> {
    object_list(item, "formats")
}

/// `isbn` of the first format entry that declares one
fn isbn(item: &Map<String, Value>) -> Extracted<String> {
    match formats(item) {
        Ok(formats) => Extracted::found(
            formats
                .into_iter()
                .find(|f| f.contains_key("isbn"))
                .and_then(|f| scalar_string(f.get("isbn"))),
        ),
        Err(d) => Extracted {
            value: None,
            diagnostic: Some(d),
        },
    }
}

/// Length in seconds from the first audiobook format that declares one
fn duration(item: &Map<String, Value>) -> Extracted<i64> {
    let formats = match formats(item) {
        Ok(formats) => formats,
        // Already reported by `isbn`
        Err(_) => return Extracted::absent(),
    };

    let declared = formats.into_iter().find(|f| {
        let audiobook = f
            .get("id")
            .and_then(Value::as_str)
            .map(|id| AUDIOBOOK_FORMATS.contains(&id))
            .unwrap_or(false);
        audiobook && f.contains_key("duration")
    });

    match declared.and_then(|f| f.get("duration")) {
        None | Some(Value::Null) => Extracted::absent(),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(seconds) => Extracted::found(Some(seconds)),
            None => Extracted::failed("duration", format!("not a whole number: {}", n)),
        },
        Some(Value::String(s)) => match parse_duration(s) {
            Some(seconds) => Extracted::found(Some(seconds)),
            None => Extracted::failed("duration", format!("unrecognized duration '{}'", s)),
        },
        Some(other) => Extracted::failed(
            "duration",
            format!("expected a number or string, got {}", kind(other)),
        ),
    }
}

/// `covers.cover510Wide.href`
///
/// A present `covers` map without the expected entry is reported; no other
/// cover sizes are tried.
fn cover_url(item: &Map<String, Value>) -> Extracted<String> {
    let covers = match item.get("covers") {
        None | Some(Value::Null) => return Extracted::absent(),
        Some(Value::Object(map)) if map.is_empty() => return Extracted::absent(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Extracted::failed(
                "coverURL",
                format!("expected covers to be an object, got {}", kind(other)),
            )
        }
    };

    match covers.get(COVER_KEY) {
        Some(Value::Object(cover)) => Extracted::found(scalar_string(cover.get("href"))),
        Some(other) => Extracted::failed(
            "coverURL",
            format!("expected {} to be an object, got {}", COVER_KEY, kind(other)),
        ),
        None => Extracted::failed("coverURL", format!("covers has no {} entry", COVER_KEY)),
    }
}

/// Series membership from `detailedSeries`, when it carries anything
fn series(item: &Map<String, Value>) -> Extracted<SeriesInfo> {
    match item.get("detailedSeries") {
        None | Some(Value::Null) => Extracted::absent(),
        Some(Value::Object(map)) if map.is_empty() => Extracted::absent(),
        Some(Value::Object(map)) => Extracted::found(Some(SeriesInfo {
            series_id: scalar_string(map.get("seriesId")),
            series_name: scalar_string(map.get("seriesName")),
            reading_order: scalar_string(map.get("readingOrder")),
        })),
        Some(other) => Extracted::failed(
            "series",
            format!("expected detailedSeries to be an object, got {}", kind(other)),
        ),
    }
}
