//! Markdown listing of stored audiobooks
//!
//! Renders one page of the store as a table with navigation hints, the
//! terminal counterpart of a paginated catalog page.

use crate::storage::{BookPage, StoredAudioBook};

/// Formats seconds as `H:MM:SS`
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

fn series_cell(book: &StoredAudioBook) -> String {
    if !book.book.is_series {
        return String::new();
    }

    let name = book.book.series_name.as_deref().unwrap_or("?");
    match book.book.reading_order {
        Some(order) => format!("{} #{}", name, order),
        None => name.to_string(),
    }
}

/// Renders one page of audiobooks as markdown
///
/// # Arguments
///
/// * `page` - The page of stored audiobooks to render
///
/// # Returns
///
/// A formatted markdown string
pub fn render_listing(page: &BookPage) -> String {
    let mut md = String::new();

    md.push_str("# Audiobooks\n\n");

    if page.total == 0 {
        md.push_str("_No audiobooks stored yet._\n");
        return md;
    }

    md.push_str(&format!(
        "Page {} of {} ({} audiobooks)\n\n",
        page.page,
        page.pages(),
        page.total
    ));

    if page.items.is_empty() {
        md.push_str("_This page is empty._\n\n");
    } else {
        md.push_str("| # | Title | Authors | Narrators | Duration | Series |\n");
        md.push_str("|---|-------|---------|-----------|----------|--------|\n");

        for item in &page.items {
            let book = &item.book;
            let title = match &book.subtitle {
                Some(subtitle) => format!("{}: {}", book.title, subtitle),
                None => book.title.clone(),
            };

            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                item.id,
                escape_cell(&title),
                escape_cell(&book.authors.join(", ")),
                escape_cell(&book.narrators.join(", ")),
                book.duration.map(format_duration).unwrap_or_default(),
                escape_cell(&series_cell(item)),
            ));
        }
        md.push('\n');
    }

    let mut nav = Vec::new();
    if let Some(prev) = page.prev_num() {
        nav.push(format!("previous: `--browse {}`", prev));
    }
    if let Some(next) = page.next_num() {
        nav.push(format!("next: `--browse {}`", next));
    }
    if !nav.is_empty() {
        md.push_str(&nav.join(" · "));
        md.push('\n');
    }

    md
}
