//! Output module for terminal rendering
//!
//! This module handles:
//! - Formatting table snapshots with range, page and indicators
//! - Formatting a single record's metrics
//! - Writing rendered reports to disk

mod detail;
mod table;

pub use detail::{format_headings, format_links, format_record_detail};
pub use table::{format_footer, format_row, format_table};

use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes rendered text to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(std::io::Error)` - Failed to create or write the file
pub fn write_report(text: &str, output_path: &Path) -> std::io::Result<()> {
    let mut file = File::create(output_path)?;
    file.write_all(text.as_bytes())?;
    Ok(())
}
