//! Output formatting for CLI results

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::models::MediaDisplay;
use crate::snapshot::NormalizedItem;

pub mod formatters;
pub mod json;
pub mod table;

/// Print a live listing as a JSON envelope or a table
pub fn print_items(items: &[NormalizedItem], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", json::format_listing(items)?),
        OutputFormat::Table => println!("{}", format_item_table(items)),
    }
    Ok(())
}

/// Render media items as a table
pub fn format_item_table(items: &[NormalizedItem]) -> String {
    let rows: Vec<MediaDisplay> = items.iter().map(MediaDisplay::from).collect();
    table::format_table(&rows)
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
