//! Mock Graph API client for testing
//!
//! Serves scripted listing pages keyed by edge path, chaining them through
//! synthetic `mock://` cursor URLs so crawls follow `paging.next` exactly as
//! they do against the real API.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::models::{MediaPage, Paging, RawMedia};
use super::{GraphApi, PageTarget};
use crate::error::{ApiError, Result};

/// Mock Graph client.
///
/// # Example
/// ```ignore
/// let mock = MockGraphClient::new()
///     .with_pages("1789/tags", vec![vec![media("1", ts)], vec![media("2", ts)]])
///     .await;
/// ```
pub struct MockGraphClient {
    account_id: String,
    /// Edge path -> pages served in order
    pages: Arc<Mutex<HashMap<String, Vec<Vec<RawMedia>>>>>,
    /// Hashtag name -> Graph ID
    hashtags: Arc<Mutex<HashMap<String, String>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Fail every page fetch after N successful ones
    fail_after: Arc<Mutex<Option<usize>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Every page target requested, in order
    captured_targets: Arc<Mutex<Vec<PageTarget>>>,
}

impl Default for MockGraphClient {
    fn default() -> Self {
        Self {
            account_id: "1789".to_string(),
            pages: Arc::new(Mutex::new(HashMap::new())),
            hashtags: Arc::new(Mutex::new(HashMap::new())),
            error: Arc::new(Mutex::new(None)),
            fail_after: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
            captured_targets: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub fetch_page: usize,
    pub resolve_hashtag_id: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.fetch_page + self.resolve_hashtag_id
    }
}

impl MockGraphClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the pages served for an edge path, e.g. `1789/tags`.
    pub async fn with_pages(self, path: &str, pages: Vec<Vec<RawMedia>>) -> Self {
        self.pages.lock().await.insert(path.to_string(), pages);
        self
    }

    /// Configure a hashtag name -> ID resolution.
    pub async fn with_hashtag(self, tag: &str, id: &str) -> Self {
        self.hashtags
            .lock()
            .await
            .insert(tag.to_string(), id.to_string());
        self
    }

    /// Configure an error to return on the next API call.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    /// Fail every page fetch once `pages` fetches have succeeded.
    pub async fn fail_after(self, pages: usize) -> Self {
        *self.fail_after.lock().await = Some(pages);
        self
    }

    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    pub async fn captured_targets(&self) -> Vec<PageTarget> {
        self.captured_targets.lock().await.clone()
    }

    async fn check_error(&self) -> Result<()> {
        if let Some(e) = self.error.lock().await.take() {
            return Err(e.into());
        }
        Ok(())
    }

    fn cursor_for(path: &str, index: usize) -> String {
        format!("mock://{}?page={}", path, index)
    }

    fn parse_cursor(url: &str) -> Option<(String, usize)> {
        let rest = url.strip_prefix("mock://")?;
        let (path, page) = rest.split_once("?page=")?;
        Some((path.to_string(), page.parse().ok()?))
    }
}

/// Build a raw Graph item for tests.
pub fn media(id: &str, timestamp: &str) -> RawMedia {
    RawMedia {
        id: Some(id.to_string()),
        media_type: Some("IMAGE".to_string()),
        media_url: Some(format!("https://cdn.example/{}.jpg", id)),
        permalink: Some(format!("https://www.instagram.com/p/{}/", id)),
        timestamp: Some(timestamp.to_string()),
        ..RawMedia::default()
    }
}

#[async_trait]
impl GraphApi for MockGraphClient {
    async fn fetch_page(&self, target: &PageTarget) -> Result<MediaPage> {
        self.captured_targets.lock().await.push(target.clone());
        self.check_error().await?;

        {
            let mut counts = self.call_count.lock().await;
            if let Some(limit) = *self.fail_after.lock().await
                && counts.fetch_page >= limit
            {
                counts.fetch_page += 1;
                return Err(ApiError::ServerError("scripted failure".to_string()).into());
            }
            counts.fetch_page += 1;
        }

        let (path, index) = match target {
            PageTarget::Endpoint { path, .. } => (path.clone(), 0),
            PageTarget::Cursor(url) => Self::parse_cursor(url)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown cursor {}", url)))?,
        };

        let pages = self.pages.lock().await;
        let Some(script) = pages.get(&path) else {
            return Err(ApiError::NotFound(path).into());
        };
        let data = script.get(index).cloned().unwrap_or_default();
        let paging = (index + 1 < script.len()).then(|| Paging {
            next: Some(Self::cursor_for(&path, index + 1)),
            cursors: None,
        });

        Ok(MediaPage { data, paging })
    }

    async fn resolve_hashtag_id(&self, tag: &str) -> Result<String> {
        self.check_error().await?;
        self.call_count.lock().await.resolve_hashtag_id += 1;

        self.hashtags
            .lock()
            .await
            .get(tag)
            .cloned()
            .ok_or_else(|| ApiError::HashtagNotFound(tag.to_string()).into())
    }

    fn account_id(&self) -> &str {
        &self.account_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ListingParams;

    #[tokio::test]
    async fn test_mock_chains_pages_through_cursors() {
        let mock = MockGraphClient::new()
            .with_pages(
                "1789/tags",
                vec![vec![media("1", "2024-01-01")], vec![media("2", "2024-01-02")]],
            )
            .await;

        let first = mock
            .fetch_page(&PageTarget::endpoint("1789/tags", ListingParams::new()))
            .await
            .unwrap();
        let next = first.next_cursor().unwrap().to_string();
        let second = mock.fetch_page(&PageTarget::Cursor(next)).await.unwrap();

        assert_eq!(second.data[0].id.as_deref(), Some("2"));
        assert!(second.next_cursor().is_none());
        assert_eq!(mock.call_counts().await.fetch_page, 2);
    }

    #[tokio::test]
    async fn test_mock_fail_after() {
        let mock = MockGraphClient::new()
            .with_pages("p", vec![vec![], vec![]])
            .await
            .fail_after(1)
            .await;

        let target = PageTarget::endpoint("p", ListingParams::new());
        assert!(mock.fetch_page(&target).await.is_ok());
        assert!(mock.fetch_page(&target).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_error_consumed_once() {
        let mock = MockGraphClient::new()
            .with_hashtag("sunset", "17841")
            .await
            .with_error(ApiError::Network("down".to_string()))
            .await;

        assert!(mock.resolve_hashtag_id("sunset").await.is_err());
        assert_eq!(mock.resolve_hashtag_id("sunset").await.unwrap(), "17841");
    }
}
