//! Normalized media items and durable collection snapshots
//!
//! A snapshot is the complete on-disk state of one crawled collection. It is
//! replaced wholesale by each completed crawl and read without locking.

pub mod crawl;
pub mod store;

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::client::models::{RawChild, RawMedia};

pub use crawl::{CrawlOptions, Crawler};
pub use store::SnapshotStore;

/// Crawlable collections of the business account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// Media the account is tagged in
    Tagged,
    /// Media the account published
    SelfMedia,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Tagged, Collection::SelfMedia];

    /// Snapshot name, also the file stem under the snapshot directory
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Tagged => "tagged",
            Collection::SelfMedia => "self-media",
        }
    }

    /// Graph edge listing this collection for `account_id`
    pub fn endpoint(&self, account_id: &str) -> String {
        match self {
            Collection::Tagged => format!("{}/tags", account_id),
            Collection::SelfMedia => format!("{}/media", account_id),
        }
    }

    /// Scheduler task name for periodic refreshes
    pub fn task_name(&self) -> String {
        format!("refresh_{}", self.name())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Media type tag as reported by the Graph API.
///
/// Unknown tags are preserved verbatim so snapshots round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaType {
    Image,
    Video,
    CarouselAlbum,
    Other(String),
}

impl MediaType {
    pub fn as_str(&self) -> &str {
        match self {
            MediaType::Image => "IMAGE",
            MediaType::Video => "VIDEO",
            MediaType::CarouselAlbum => "CAROUSEL_ALBUM",
            MediaType::Other(s) => s,
        }
    }
}

impl From<String> for MediaType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "IMAGE" => MediaType::Image,
            "VIDEO" => MediaType::Video,
            "CAROUSEL_ALBUM" => MediaType::CarouselAlbum,
            _ => MediaType::Other(s),
        }
    }
}

impl From<MediaType> for String {
    fn from(t: MediaType) -> Self {
        match t {
            MediaType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of a carousel album
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildItem {
    pub media_type: Option<MediaType>,
    pub media_url: Option<String>,
}

/// Flat, normalized media item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    pub id: Option<String>,
    pub username: Option<String>,
    pub caption: Option<String>,
    pub media_type: Option<MediaType>,
    pub media_url: Option<String>,
    pub permalink: Option<String>,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub children: Vec<ChildItem>,
}

impl NormalizedItem {
    /// Normalize a remote item. Missing keys become `None`; `media_url`
    /// falls back to `thumbnail_url`.
    pub fn from_raw(raw: RawMedia) -> Self {
        let children = raw
            .children
            .map(|c| c.data.into_iter().map(ChildItem::from_raw).collect())
            .unwrap_or_default();

        Self {
            id: raw.id,
            username: raw.username,
            caption: raw.caption,
            media_type: raw.media_type.map(MediaType::from),
            media_url: raw.media_url.or(raw.thumbnail_url),
            permalink: raw.permalink,
            timestamp: raw.timestamp,
            children,
        }
    }

    /// Parsed timestamp, `None` when missing or unparsable.
    pub fn instant(&self) -> Option<i64> {
        self.timestamp.as_deref().and_then(parse_instant)
    }

    pub fn is_carousel(&self) -> bool {
        self.media_type == Some(MediaType::CarouselAlbum)
    }
}

impl ChildItem {
    fn from_raw(raw: RawChild) -> Self {
        Self {
            media_type: raw.media_type.map(MediaType::from),
            media_url: raw.media_url.or(raw.thumbnail_url),
        }
    }
}

/// Complete state of one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub updated_at: Option<String>,
    #[serde(default)]
    pub count: usize,
    #[serde(rename = "data")]
    pub items: Vec<NormalizedItem>,
}

impl Snapshot {
    /// Snapshot of a collection that was never crawled
    pub fn empty() -> Self {
        Self {
            updated_at: None,
            count: 0,
            items: Vec::new(),
        }
    }

    /// Build a snapshot, keeping `count` consistent with `items`.
    pub fn new(updated_at: impl Into<String>, items: Vec<NormalizedItem>) -> Self {
        Self {
            updated_at: Some(updated_at.into()),
            count: items.len(),
            items,
        }
    }
}

/// Sort newest-first by timestamp.
///
/// Stable: equal timestamps keep their relative order. Missing or unparsable
/// timestamps sort after every parsable one.
pub fn sort_newest_first(items: &mut [NormalizedItem]) {
    items.sort_by_key(|item| std::cmp::Reverse(item.instant()));
}

/// Parse a timestamp to unix seconds.
///
/// Accepts RFC 3339, Graph style `2024-05-01T10:00:00+0000`, a naive
/// `YYYY-MM-DDTHH:MM:SS` (UTC), a bare date (midnight UTC) or unix seconds.
pub fn parse_instant(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc().timestamp());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
    }
    raw.parse::<i64>().ok()
}
