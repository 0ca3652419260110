//! Full-listing crawler
//!
//! Walks a Graph listing page by page, merges items by id and replaces the
//! collection's snapshot with the result.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};

use super::{NormalizedItem, Snapshot, SnapshotStore, sort_newest_first};
use crate::client::pagination::clamp_page_size;
use crate::client::{GraphApi, ListingParams, PageTarget};
use crate::clock::SharedClock;
use crate::error::Result;

/// Crawl bounds
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Items per page, clamped to the Graph maximum
    pub page_size: usize,
    /// Safety bound against runaway or cyclic pagination
    pub max_pages: usize,
    pub fields: Option<String>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            page_size: 3,
            max_pages: 500,
            fields: None,
        }
    }
}

/// Progress after each fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlProgress {
    pub pages: usize,
    pub items: usize,
}

/// Crawls listings into the snapshot store
pub struct Crawler<C: GraphApi> {
    client: Arc<C>,
    store: SnapshotStore,
    clock: SharedClock,
}

impl<C: GraphApi> Crawler<C> {
    pub fn new(client: Arc<C>, store: SnapshotStore, clock: SharedClock) -> Self {
        Self {
            client,
            store,
            clock,
        }
    }

    /// Crawl `endpoint` and persist the result as `collection`.
    ///
    /// Stops at the last page, after `max_pages` pages, or at the first
    /// failed fetch. A failed fetch after at least one page is logged and the
    /// items gathered so far are still saved. When the first page fails the
    /// error is returned and the stored snapshot is left untouched.
    pub async fn crawl<F>(
        &self,
        collection: &str,
        endpoint: &str,
        options: &CrawlOptions,
        mut on_page: F,
    ) -> Result<Snapshot>
    where
        F: FnMut(CrawlProgress),
    {
        let max_pages = options.max_pages.max(1);
        let params = ListingParams::new()
            .limit(clamp_page_size(options.page_size))
            .fields(options.fields.as_deref());

        let mut merged = MergedItems::default();
        let mut target = PageTarget::endpoint(endpoint, params);
        let mut pages = 0;

        while pages < max_pages {
            let page = match self.client.fetch_page(&target).await {
                Ok(page) => page,
                Err(e) if pages == 0 => {
                    log::warn!("Crawl of '{}' failed on the first page: {}", collection, e);
                    return Err(e);
                }
                Err(e) => {
                    log::warn!(
                        "Crawl of '{}' stopped after {} pages: {}",
                        collection,
                        pages,
                        e
                    );
                    break;
                }
            };
            pages += 1;

            let next = page.next_cursor().map(str::to_string);
            for raw in page.data {
                merged.insert(NormalizedItem::from_raw(raw));
            }
            on_page(CrawlProgress {
                pages,
                items: merged.len(),
            });

            match next {
                Some(cursor) => target = PageTarget::Cursor(cursor),
                None => break,
            }
        }

        if pages == max_pages {
            log::debug!("Crawl of '{}' reached the {} page bound", collection, max_pages);
        }

        let mut items = merged.into_items();
        sort_newest_first(&mut items);

        let snapshot = Snapshot::new(self.timestamp(), items);
        self.store.save(collection, &snapshot)?;
        log::info!(
            "Crawled '{}': {} items from {} pages",
            collection,
            snapshot.count,
            pages
        );
        Ok(snapshot)
    }

    fn timestamp(&self) -> String {
        DateTime::<Utc>::from_timestamp(self.clock.now(), 0)
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}

/// Id-keyed accumulator. A repeated id replaces the earlier item in place.
#[derive(Default)]
struct MergedItems {
    index: HashMap<String, usize>,
    items: Vec<NormalizedItem>,
}

impl MergedItems {
    fn insert(&mut self, item: NormalizedItem) {
        let Some(id) = item.id.clone().filter(|id| !id.is_empty()) else {
            log::debug!("Skipping item without id");
            return;
        };
        match self.index.get(&id) {
            Some(&pos) => self.items[pos] = item,
            None => {
                self.index.insert(id, self.items.len());
                self.items.push(item);
            }
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn into_items(self) -> Vec<NormalizedItem> {
        self.items
    }
}
