//! Graph API response shapes
//!
//! Remote items are loosely typed. Every field is optional and scalar values
//! of the wrong JSON type degrade to `None` (numbers are stringified) instead
//! of failing the whole page.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Media item as returned by the Graph API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMedia {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub caption: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub media_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub media_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub thumbnail_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub permalink: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_children")]
    pub children: Option<RawChildren>,
}

/// `children` edge of a carousel album
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawChildren {
    #[serde(default)]
    pub data: Vec<RawChild>,
}

/// Carousel child as returned by the Graph API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawChild {
    #[serde(default, deserialize_with = "lenient_string")]
    pub media_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub media_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub thumbnail_url: Option<String>,
}

/// One page of a Graph listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaPage {
    #[serde(default)]
    pub data: Vec<RawMedia>,

    #[serde(default)]
    pub paging: Option<Paging>,
}

impl MediaPage {
    /// Cursor URL for the following page, if any
    pub fn next_cursor(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|p| p.next.as_deref())
            .filter(|next| !next.is_empty())
    }
}

/// Graph `paging` block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<String>,

    #[serde(default)]
    pub cursors: Option<Cursors>,
}

/// Graph cursor pair
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cursors {
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
}

/// Result of `ig_hashtag_search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HashtagSearch {
    #[serde(default)]
    pub data: Vec<HashtagId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HashtagId {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
}

/// Graph error envelope: `{"error": {"message": ...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct GraphErrorEnvelope {
    pub error: GraphError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphError {
    #[serde(default)]
    pub message: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_children<'de, D>(deserializer: D) -> Result<Option<RawChildren>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
