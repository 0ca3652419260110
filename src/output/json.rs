//! JSON output formatting

use chrono::Utc;
use serde::Serialize;

/// Envelope for live listing output
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a, T: Serialize> {
    /// The listed items
    pub data: &'a [T],

    /// Metadata about the response
    pub meta: Metadata,
}

/// Metadata included in JSON output
#[derive(Debug, Serialize)]
pub struct Metadata {
    /// Number of items in `data`
    pub count: usize,

    /// Timestamp of the response
    pub timestamp: String,

    /// CLI version
    pub version: String,
}

impl<'a, T: Serialize> JsonOutput<'a, T> {
    /// Wrap a listing with metadata
    pub fn new(data: &'a [T]) -> Self {
        Self {
            data,
            meta: Metadata {
                count: data.len(),
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

/// Format a listing as pretty-printed JSON
pub fn format_listing<T: Serialize>(data: &[T]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize)]
    struct Row {
        id: String,
    }

    #[test]
    fn test_envelope_counts_items() {
        let rows = vec![Row { id: "1".to_string() }, Row { id: "2".to_string() }];
        let output = JsonOutput::new(&rows);

        assert_eq!(output.meta.count, 2);
        assert_eq!(output.meta.version, env!("CARGO_PKG_VERSION"));
        assert!(!output.meta.timestamp.is_empty());
    }

    #[test]
    fn test_format_listing_shape() {
        let rows = vec![Row { id: "17890".to_string() }];
        let value: serde_json::Value =
            serde_json::from_str(&format_listing(&rows).unwrap()).unwrap();

        assert_eq!(value["data"][0]["id"], "17890");
        assert_eq!(value["meta"]["count"], 1);
        assert!(value["meta"]["timestamp"].is_string());
    }

    #[test]
    fn test_format_listing_empty() {
        let rows: Vec<Row> = Vec::new();
        let result = format_listing(&rows).unwrap();
        assert!(result.contains("\"data\": []"));
        assert!(result.contains("\"count\": 0"));
    }
}
