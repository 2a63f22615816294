//! Plain-text rendering of table snapshots

use crate::record::Record;
use crate::table::{ErrorSource, TableView};

const ADDRESS_WIDTH: usize = 40;
const TITLE_WIDTH: usize = 24;

/// Formats a table snapshot for the terminal
///
/// A foreground failure replaces the rows with an error panel. A failed
/// background refresh or action keeps the rows and adds a banner.
pub fn format_table(view: &TableView) -> String {
    let mut out = String::new();

    if let Some(error) = &view.error {
        if error.blocks_view() {
            out.push_str("Error loading analyses\n");
            out.push_str(&format!("  {}\n", error.error));
            return out;
        }

        let prefix = match error.source {
            ErrorSource::Poll => "Update failed",
            _ => "Action failed",
        };
        out.push_str(&format!("! {}: {}\n", prefix, error.error));
    }

    if view.loading && !view.loaded {
        out.push_str("Loading...\n");
        return out;
    }

    if view.rows.is_empty() {
        out.push_str("No analyses found\n");
    } else {
        out.push_str(&format!(
            "    {:>5}  {:<aw$}  {:<12}  {:<tw$}  {:>5}  {:>5}  {:>6}  {}\n",
            "ID",
            "Address",
            "Status",
            "Title",
            "Int",
            "Ext",
            "Broken",
            "Created",
            aw = ADDRESS_WIDTH,
            tw = TITLE_WIDTH,
        ));
        for record in &view.rows {
            let checked = view.selected.contains(&record.id);
            out.push_str(&format_row(record, checked));
            out.push('\n');
        }
    }

    out.push_str(&format_footer(view));
    out.push('\n');
    out
}

/// Formats one table row; `checked` marks selected rows
pub fn format_row(record: &Record, checked: bool) -> String {
    format!(
        "[{}] {:>5}  {:<aw$}  {:<12}  {:<tw$}  {:>5}  {:>5}  {:>6}  {}",
        if checked { "x" } else { " " },
        record.id,
        truncate(&record.address, ADDRESS_WIDTH),
        record.status.label(),
        truncate(record.title_or_empty(), TITLE_WIDTH),
        record.internal_links,
        record.external_links,
        record.broken_links,
        record.created_at.format("%Y-%m-%d %H:%M"),
        aw = ADDRESS_WIDTH,
        tw = TITLE_WIDTH,
    )
}

/// Range, page position and indicators under the rows
pub fn format_footer(view: &TableView) -> String {
    let mut footer = match view.range {
        Some((first, last)) => format!("Showing {}-{} of {}", first, last, view.total),
        None => format!("Showing 0 of {}", view.total),
    };

    footer.push_str(&format!(
        " | Page {} of {}",
        view.query.page(),
        view.total_pages.max(1)
    ));

    if view.page_filtered {
        footer.push_str(" | status filter applies to this page only");
    }
    if !view.selected.is_empty() {
        footer.push_str(&format!(" | {} selected", view.selected.len()));
    }
    if view.updating {
        footer.push_str(" | updating...");
    }
    if !view.auto_refresh {
        footer.push_str(" | auto-refresh off");
    }
    footer
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
