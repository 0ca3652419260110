//! Table output formatting

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, Width, object::Rows, object::Segment},
};

/// Widest a single cell may grow before wrapping
const MAX_CELL_WIDTH: usize = 60;

/// Format rows as a rounded table, or a placeholder when empty
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No media found.".to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .with(Modify::new(Segment::all()).with(Width::wrap(MAX_CELL_WIDTH)));

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaDisplay;

    fn row(id: &str, caption: &str) -> MediaDisplay {
        MediaDisplay {
            id: id.to_string(),
            media_type: "IMAGE".to_string(),
            username: "someone".to_string(),
            posted: "2024-05-01 12:30".to_string(),
            caption: caption.to_string(),
            permalink: format!("https://www.instagram.com/p/{}/", id),
        }
    }

    #[test]
    fn test_format_table_empty() {
        let rows: Vec<MediaDisplay> = Vec::new();
        assert_eq!(format_table(&rows), "No media found.");
    }

    #[test]
    fn test_format_table_headers_and_rows() {
        let result = format_table(&[row("abc", "first"), row("def", "second")]);

        for header in ["ID", "TYPE", "USER", "POSTED", "CAPTION", "PERMALINK"] {
            assert!(result.contains(header), "missing header {}", header);
        }
        assert!(result.contains("first"));
        assert!(result.contains("second"));
        assert!(result.contains("╭"));
        assert!(result.contains("╰"));
    }

    #[test]
    fn test_format_table_wraps_wide_cells() {
        let wide = "x".repeat(MAX_CELL_WIDTH * 2);
        let result = format_table(&[row("abc", &wide)]);
        assert!(result.lines().all(|l| !l.contains(&wide)));
    }
}
