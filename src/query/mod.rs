//! Local snapshot queries
//!
//! Filter, sort newest-first, paginate, then apply carousel child
//! selection to the returned page only.

pub mod filter;
pub mod selector;

use serde::Serialize;

use crate::snapshot::{NormalizedItem, Snapshot, sort_newest_first};

pub use filter::{MediaFilter, PageWindow};

/// One page of query results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub items: Vec<NormalizedItem>,
    /// Size of `items`
    pub returned: usize,
    /// Filtered count before pagination
    pub total: usize,
}

/// Run a query against a snapshot.
pub fn query(snapshot: &Snapshot, filter: &MediaFilter, window: &PageWindow) -> QueryResult {
    let mut matched: Vec<NormalizedItem> = snapshot
        .items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect();
    sort_newest_first(&mut matched);

    let total = matched.len();
    let range = window.slice(&matched);
    let mut items: Vec<_> = matched.drain(range).collect();

    if let Some(selector) = filter.shortcodes.as_ref().filter(|s| s.has_selections()) {
        for item in &mut items {
            selector.apply_selection(item);
        }
    }

    QueryResult {
        returned: items.len(),
        total,
        items,
    }
}

/// JSON body for a local query
#[derive(Debug, Serialize)]
pub struct LocalResponse<'a> {
    pub source: &'static str,
    pub updated_at: Option<&'a str>,
    pub requested: PageWindow,
    pub returned: usize,
    pub total: usize,
    pub data: &'a [NormalizedItem],
}

impl<'a> LocalResponse<'a> {
    pub fn new(snapshot: &'a Snapshot, window: PageWindow, result: &'a QueryResult) -> Self {
        Self {
            source: "local",
            updated_at: snapshot.updated_at.as_deref(),
            requested: window,
            returned: result.returned,
            total: result.total,
            data: &result.items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestParams;
    use crate::snapshot::tests::item;
    use crate::snapshot::{ChildItem, MediaType};

    fn snapshot(n: usize) -> Snapshot {
        // Stored oldest-first to exercise sorting
        let items = (0..n)
            .map(|i| item(&format!("m{}", i), Some(&format!("2024-01-{:02}", i + 1))))
            .collect();
        Snapshot::new("2024-02-01T00:00:00+00:00", items)
    }

    #[test]
    fn test_query_sorts_and_paginates() {
        let snap = snapshot(5);
        let result = query(&snap, &MediaFilter::default(), &PageWindow::new(Some(2), Some(1)));

        let ids: Vec<_> = result.items.iter().map(|i| i.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["m3", "m2"]);
        assert_eq!(result.returned, 2);
        assert_eq!(result.total, 5);
    }

    #[test]
    fn test_pagination_counts() {
        let snap = snapshot(7);
        for (limit, offset) in [(None, 0), (None, 5), (Some(3), 0), (Some(3), 6), (Some(3), 9)] {
            let window = PageWindow::new(limit, Some(offset));
            let result = query(&snap, &MediaFilter::default(), &window);
            let remaining = 7usize.saturating_sub(offset as usize);
            let expected = match limit {
                Some(l) => remaining.min(l as usize),
                None => remaining,
            };
            assert_eq!(result.returned, expected);
            assert_eq!(result.total, 7);
        }
    }

    #[test]
    fn test_total_counts_filtered_items() {
        let snap = snapshot(5);
        let mut params = RequestParams::new();
        params.push("ids", "m0,m4,missing");

        let result = query(&snap, &MediaFilter::from_params(&params), &PageWindow::new(Some(1), None));
        assert_eq!(result.total, 2);
        assert_eq!(result.returned, 1);
        assert_eq!(result.items[0].id.as_deref(), Some("m4"));
    }

    #[test]
    fn test_selection_applies_to_returned_page_only() {
        let mut album = item("album", Some("2024-03-01"));
        album.media_type = Some(MediaType::CarouselAlbum);
        album.permalink = Some("https://x/p/abc123/".to_string());
        album.children = vec![
            ChildItem {
                media_type: Some(MediaType::Image),
                media_url: Some("https://cdn.example/c1.jpg".to_string()),
            },
            ChildItem {
                media_type: Some(MediaType::Video),
                media_url: Some("https://cdn.example/c2.mp4".to_string()),
            },
        ];
        let snap = Snapshot::new("t", vec![item("other", Some("2024-01-01")), album.clone()]);

        let mut params = RequestParams::new();
        params.push("shortcode", "abc123!2");
        let filter = MediaFilter::from_params(&params);

        let result = query(&snap, &filter, &PageWindow::default());
        assert_eq!(result.total, 1);
        let it = &result.items[0];
        assert_eq!(it.media_url.as_deref(), Some("https://cdn.example/c2.mp4"));
        assert_eq!(it.media_type, Some(MediaType::Video));
        assert_eq!(it.permalink.as_deref(), Some("https://x/p/abc123/?img_index=2"));

        // The snapshot itself is untouched
        assert_eq!(snap.items[1], album);
    }

    #[test]
    fn test_local_response_shape() {
        let snap = snapshot(3);
        let window = PageWindow::new(Some(2), None);
        let result = query(&snap, &MediaFilter::default(), &window);

        let json = serde_json::to_value(LocalResponse::new(&snap, window, &result)).unwrap();
        assert_eq!(json["source"], "local");
        assert_eq!(json["updated_at"], "2024-02-01T00:00:00+00:00");
        assert_eq!(json["requested"]["limit"], 2);
        assert_eq!(json["requested"]["offset"], 0);
        assert_eq!(json["returned"], 2);
        assert_eq!(json["total"], 3);
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_never_crawled_snapshot() {
        let snap = Snapshot::empty();
        let window = PageWindow::default();
        let result = query(&snap, &MediaFilter::default(), &window);
        let json = serde_json::to_value(LocalResponse::new(&snap, window, &result)).unwrap();
        assert!(json["updated_at"].is_null());
        assert!(json["requested"]["limit"].is_null());
        assert_eq!(json["total"], 0);
    }
}
