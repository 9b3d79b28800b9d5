use regex::Regex;
use std::sync::OnceLock;

/// Replacement for a literal double hyphen
const EM_DASH: &str = " — ";

/// Normalizes a string value taken from the catalog
///
/// # Normalization Steps
///
/// 1. Replace the literal two-character sequence `\n` with a space
/// 2. Replace every `--` with ` — `
/// 3. Trim leading and trailing whitespace
///
/// Trimming last keeps the step idempotent: a trailing `--` would otherwise
/// leave a trailing space behind on the first pass.
///
/// # Examples
///
/// ```
/// use audioshelf::record::normalize_text;
///
/// assert_eq!(normalize_text("  Krieg--und Frieden \\n"), "Krieg — und Frieden");
/// ```
pub fn normalize_text(value: &str) -> String {
    value
        .replace("\\n", " ")
        .replace("--", EM_DASH)
        .trim()
        .to_string()
}

/// Normalizes every element of a list of strings
pub fn normalize_all(values: Vec<String>) -> Vec<String> {
    values.iter().map(|v| normalize_text(v)).collect()
}

fn tag_pattern() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"))
}

/// Removes HTML tags from a description, leaving the text between them
///
/// Entities are left as they are.
pub fn strip_html(value: &str) -> String {
    tag_pattern().replace_all(value, "").into_owned()
}

/// Parses a duration given as `HH:MM:SS`, `MM:SS` or plain seconds
///
/// Returns `None` for anything else, including empty components.
pub fn parse_duration(value: &str) -> Option<i64> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    if parts.len() > 3 {
        return None;
    }

    let mut seconds: i64 = 0;
    for part in parts {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        seconds = seconds.checked_mul(60)?.checked_add(part.parse::<i64>().ok()?)?;
    }

    Some(seconds)
}
