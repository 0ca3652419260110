//! Instagram Graph API client

use async_trait::async_trait;

use crate::error::Result;
use models::MediaPage;

pub mod graph;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod pagination;

pub use graph::GraphClient;
#[cfg(test)]
pub use mock::MockGraphClient;
pub use pagination::{HashtagEdge, ListingParams, PageTarget};

/// Remote listing client.
///
/// Everything the crawler and cached listings need from the Graph API:
/// page-at-a-time listing fetches plus hashtag name resolution.
#[async_trait]
pub trait GraphApi: Send + Sync {
    /// Fetch one page of a listing
    async fn fetch_page(&self, target: &PageTarget) -> Result<MediaPage>;

    /// Resolve a hashtag name (without `#`) to its Graph ID
    async fn resolve_hashtag_id(&self, tag: &str) -> Result<String>;

    /// Business account the client acts for
    fn account_id(&self) -> &str;
}
