//! Common display utilities and helpers

use chrono::DateTime;

use crate::snapshot::parse_instant;

/// Truncate to `max_chars` characters with an ellipsis.
///
/// Counts characters, not bytes, since captions routinely carry emoji.
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Collapse line breaks so a caption fits one table row
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Format a media timestamp as `YYYY-MM-DD HH:MM` UTC, or as-is when unparsable
pub fn format_media_time(timestamp: &str) -> String {
    parse_instant(timestamp)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
