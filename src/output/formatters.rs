//! Reusable formatting utilities for CLI output

use chrono::{DateTime, Local};

/// Format bytes as human-readable size
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Format unix seconds as local `YYYY-MM-DD HH:MM`, "never" for zero.
pub fn format_unix_local(secs: i64) -> String {
    if secs <= 0 {
        return "never".to_string();
    }
    DateTime::from_timestamp(secs, 0)
        .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_format_unix_local_never() {
        assert_eq!(format_unix_local(0), "never");
    }

    #[test]
    fn test_format_unix_local_shape() {
        let formatted = format_unix_local(1_717_200_000);
        assert_eq!(formatted.len(), "2024-06-01 00:00".len());
    }
}
