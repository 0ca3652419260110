//! Cached live listings over any `GraphApi`
//!
//! Each listing is a single Graph page stored in the TTL cache under a key
//! built from the listing scope and a digest of the requested fields.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::key::{listing_key, sanitize_key};
use crate::cache::{CacheStorage, CacheTtl};
use crate::client::pagination::clamp_page_size;
use crate::client::{GraphApi, HashtagEdge, ListingParams, PageTarget};
use crate::error::{ApiError, Result};
use crate::snapshot::{NormalizedItem, sort_newest_first};

/// Cached wrapper for any `GraphApi` implementation.
///
/// Cache can be disabled by passing `None` (for `--no-cache`).
pub struct CachedGraphClient<C: GraphApi> {
    inner: Arc<C>,
    cache: Option<CacheStorage>,
    ttl: Duration,
}

impl<C: GraphApi> CachedGraphClient<C> {
    /// Create a new cached client wrapper.
    ///
    /// # Arguments
    /// * `inner` - The underlying API client to wrap
    /// * `cache` - Cache storage, or `None` to always hit the network
    pub fn new(inner: C, cache: Option<CacheStorage>) -> Self {
        Self {
            inner: Arc::new(inner),
            cache,
            ttl: CacheTtl::LISTINGS,
        }
    }

    /// Override the listing TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Shared handle to the wrapped client, for uncached paths like crawls
    pub fn inner(&self) -> &Arc<C> {
        &self.inner
    }

    fn get_cached(&self, key: &str) -> Option<Vec<NormalizedItem>> {
        let hit = self.cache.as_ref()?.get(key);
        if hit.is_some() {
            log::debug!("Cache hit: {}", key);
        }
        hit
    }

    fn set_cached(&self, key: &str, items: &[NormalizedItem]) {
        if let Some(ref cache) = self.cache
            && let Err(e) = cache.put(key, &items, self.ttl)
        {
            log::warn!("Failed to cache '{}': {}", key, e);
        }
    }

    /// Fetch one page of an edge and normalize it
    async fn fetch_items(
        &self,
        path: String,
        limit: usize,
        fields: Option<&str>,
    ) -> Result<Vec<NormalizedItem>> {
        let params = ListingParams::new().limit(limit).fields(fields);
        let page = self
            .inner
            .fetch_page(&PageTarget::endpoint(path, params))
            .await?;
        Ok(page.data.into_iter().map(NormalizedItem::from_raw).collect())
    }

    /// Recent or top media for a hashtag.
    ///
    /// The tag is lower-cased with leading `#` and surrounding spaces removed.
    pub async fn hashtag_media(
        &self,
        tag: &str,
        edge: HashtagEdge,
        limit: usize,
        fields: Option<&str>,
    ) -> Result<Vec<NormalizedItem>> {
        let tag = normalize_tag(tag);
        if tag.is_empty() {
            return Err(ApiError::BadRequest("hashtag is empty".to_string()).into());
        }
        let limit = clamp_page_size(limit);
        let fields_sel = ListingParams::new().fields(fields);
        let key = listing_key(
            &["tag", &sanitize_key(&tag), edge.as_str(), &limit.to_string()],
            &format!("{}|{}", tag, fields_sel.fields_or_default()),
        );

        if let Some(items) = self.get_cached(&key) {
            return Ok(items);
        }

        let hashtag_id = self.inner.resolve_hashtag_id(&tag).await?;
        let params = fields_sel
            .limit(limit)
            .param("user_id", self.inner.account_id());
        let page = self
            .inner
            .fetch_page(&PageTarget::endpoint(
                format!("{}/{}", hashtag_id, edge.as_str()),
                params,
            ))
            .await?;
        let items: Vec<_> = page.data.into_iter().map(NormalizedItem::from_raw).collect();

        self.set_cached(&key, &items);
        Ok(items)
    }

    /// Media published by the account
    pub async fn user_media(
        &self,
        limit: usize,
        fields: Option<&str>,
    ) -> Result<Vec<NormalizedItem>> {
        self.account_listing("user_media", "media", limit, fields).await
    }

    /// Media the account is tagged in
    pub async fn tagged_media(
        &self,
        limit: usize,
        fields: Option<&str>,
    ) -> Result<Vec<NormalizedItem>> {
        self.account_listing("user_tags", "tags", limit, fields).await
    }

    async fn account_listing(
        &self,
        scope: &str,
        edge: &str,
        limit: usize,
        fields: Option<&str>,
    ) -> Result<Vec<NormalizedItem>> {
        let account = self.inner.account_id().to_string();
        let limit = clamp_page_size(limit);
        let key = listing_key(
            &[scope, &sanitize_key(&account), &limit.to_string()],
            ListingParams::new().fields(fields).fields_or_default(),
        );

        if let Some(items) = self.get_cached(&key) {
            return Ok(items);
        }

        let items = self
            .fetch_items(format!("{}/{}", account, edge), limit, fields)
            .await?;
        self.set_cached(&key, &items);
        Ok(items)
    }

    /// Own and tagged media merged newest-first, one entry per id.
    pub async fn merged_media(
        &self,
        limit: usize,
        fields: Option<&str>,
    ) -> Result<Vec<NormalizedItem>> {
        let account = self.inner.account_id().to_string();
        let limit = clamp_page_size(limit);
        let key = listing_key(
            &["user_merged", &sanitize_key(&account), &limit.to_string()],
            ListingParams::new().fields(fields).fields_or_default(),
        );

        if let Some(items) = self.get_cached(&key) {
            return Ok(items);
        }

        let (own, tagged) = futures::try_join!(
            self.fetch_items(format!("{}/media", account), limit, fields),
            self.fetch_items(format!("{}/tags", account), limit, fields),
        )?;

        let items = merge_listings(own, tagged, limit);
        self.set_cached(&key, &items);
        Ok(items)
    }

    /// Children of a carousel album. Never cached.
    pub async fn children(
        &self,
        media_id: &str,
        fields: Option<&str>,
    ) -> Result<Vec<NormalizedItem>> {
        let fields = fields
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(CHILD_FIELDS);
        let params = ListingParams::new().fields(Some(fields));
        let page = self
            .inner
            .fetch_page(&PageTarget::endpoint(format!("{}/children", media_id), params))
            .await?;
        Ok(page.data.into_iter().map(NormalizedItem::from_raw).collect())
    }
}

/// Default field selection for carousel children
const CHILD_FIELDS: &str = "id,media_type,media_url,thumbnail_url,permalink,timestamp";

/// Strip `#` and spaces, lower-case
pub fn normalize_tag(tag: &str) -> String {
    tag.trim_matches(|c: char| c == '#' || c.is_whitespace())
        .to_lowercase()
}

/// Sort newest-first, keep the first occurrence of each id, truncate.
///
/// Items without an id are dropped.
fn merge_listings(
    own: Vec<NormalizedItem>,
    tagged: Vec<NormalizedItem>,
    limit: usize,
) -> Vec<NormalizedItem> {
    let mut all: Vec<_> = own.into_iter().chain(tagged).collect();
    sort_newest_first(&mut all);

    let mut seen = HashSet::new();
    all.into_iter()
        .filter(|item| match item.id.as_deref() {
            Some(id) if !id.is_empty() => seen.insert(id.to_string()),
            _ => false,
        })
        .take(limit)
        .collect()
}
