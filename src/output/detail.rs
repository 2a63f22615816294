//! Plain-text rendering of a single record

use crate::record::{Record, RecordStatus};

/// Formats the detail view of a record
///
/// Metrics are only shown once the analysis is done.
pub fn format_record_detail(record: &Record) -> String {
    let mut out = String::new();

    out.push_str(&format!("Analysis #{}\n", record.id));
    out.push_str(&format!("  Address: {}\n", record.address));
    out.push_str(&format!("  Status:  {}\n", record.status.label()));
    out.push_str(&format!(
        "  Created: {}\n",
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    match record.status {
        RecordStatus::Done => {}
        RecordStatus::Error => {
            out.push_str("\nThe analysis failed. Re-run it to try again.\n");
            return out;
        }
        RecordStatus::Queued | RecordStatus::Running => {
            out.push_str("\nAnalysis in progress...\n");
            return out;
        }
    }

    out.push_str(&format!("  Title:   {}\n", record.title.as_deref().unwrap_or("-")));
    out.push_str(&format!(
        "  HTML:    {}\n",
        record.html_version.as_deref().unwrap_or("unknown")
    ));
    out.push_str(&format!(
        "  Login form: {}\n",
        if record.has_login_form { "yes" } else { "no" }
    ));

    out.push_str("\nHeadings\n");
    out.push_str(&format_headings(record));

    out.push_str("\nLinks\n");
    out.push_str(&format_links(record));
    out
}

/// One line per heading level with a proportional bar
pub fn format_headings(record: &Record) -> String {
    let counts = record.headings();
    let max = counts.iter().copied().max().unwrap_or(0);

    let mut out = String::new();
    for (level, count) in counts.iter().enumerate() {
        out.push_str(&format!(
            "  H{} {:>4} {}\n",
            level + 1,
            count,
            bar(*count, max, 30)
        ));
    }
    out
}

/// Internal/external/broken breakdown
pub fn format_links(record: &Record) -> String {
    let total = record.total_links();
    let mut out = String::new();
    out.push_str(&format!(
        "  Internal {:>5} ({})\n",
        record.internal_links,
        percent(record.internal_links, total)
    ));
    out.push_str(&format!(
        "  External {:>5} ({})\n",
        record.external_links,
        percent(record.external_links, total)
    ));
    out.push_str(&format!("  Broken   {:>5}\n", record.broken_links));
    out.push_str(&format!("  Total    {:>5}\n", total));

    if !record.link_counts_consistent() {
        out.push_str("  (broken count exceeds links found)\n");
    }
    out
}

fn bar(count: u32, max: u32, width: u32) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (u64::from(count) * u64::from(width)).div_ceil(u64::from(max));
    "#".repeat(len as usize)
}

fn percent(part: u32, total: u32) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.0}%", f64::from(part) * 100.0 / f64::from(total))
}
