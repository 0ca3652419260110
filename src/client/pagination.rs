//! Pagination helpers for Graph listings
//!
//! Graph listings are cursor-paginated: the first request names an edge
//! (`{account}/tags`) with a page size, and every response carries an
//! absolute `paging.next` URL for the following page.

/// Fields requested for media listings unless overridden
pub const DEFAULT_FIELDS: &str = "id,caption,media_type,media_url,permalink,thumbnail_url,timestamp,username,children{media_type,media_url,thumbnail_url}";

/// Largest page the Graph API serves for media edges
pub const MAX_PAGE_SIZE: usize = 50;

/// Where to fetch a page from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTarget {
    /// First page of an edge, relative to the versioned API root
    Endpoint {
        path: String,
        params: ListingParams,
    },
    /// Absolute `paging.next` URL returned by a previous page
    Cursor(String),
}

impl PageTarget {
    pub fn endpoint(path: impl Into<String>, params: ListingParams) -> Self {
        PageTarget::Endpoint {
            path: path.into(),
            params,
        }
    }
}

/// Query parameters for the first page of a listing.
///
/// Use the builder methods to configure:
/// ```ignore
/// let params = ListingParams::new().limit(25).param("user_id", "1789");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingParams {
    /// Items per page, clamped to `1..=MAX_PAGE_SIZE`
    pub limit: Option<usize>,
    /// Graph field selection; `DEFAULT_FIELDS` when unset
    pub fields: Option<String>,
    /// Additional edge-specific parameters
    pub extra: Vec<(String, String)>,
}

impl ListingParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(clamp_page_size(limit));
        self
    }

    /// Set the field selection. Blank selections keep the default.
    pub fn fields(mut self, fields: Option<&str>) -> Self {
        self.fields = fields
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// Effective field selection
    pub fn fields_or_default(&self) -> &str {
        self.fields.as_deref().unwrap_or(DEFAULT_FIELDS)
    }

    /// Convert to query string parameters (without the access token).
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("fields".to_string(), self.fields_or_default().to_string())];

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params.extend(self.extra.iter().cloned());

        params
    }
}

/// Hashtag media edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashtagEdge {
    /// Most recent media (last 24 hours)
    Recent,
    /// Most popular media
    Top,
}

impl HashtagEdge {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashtagEdge::Recent => "recent_media",
            HashtagEdge::Top => "top_media",
        }
    }
}

/// Clamp a requested page size to what the Graph API accepts.
pub fn clamp_page_size(size: usize) -> usize {
    size.clamp(1, MAX_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_params_default_fields() {
        let params = ListingParams::new();
        let query = params.to_query_params();
        assert_eq!(query.len(), 1);
        assert_eq!(query[0], ("fields".to_string(), DEFAULT_FIELDS.to_string()));
    }

    #[test]
    fn test_listing_params_builder() {
        let params = ListingParams::new()
            .limit(25)
            .fields(Some("id,permalink"))
            .param("user_id", "1789");

        let query = params.to_query_params();
        assert!(query.contains(&("fields".to_string(), "id,permalink".to_string())));
        assert!(query.contains(&("limit".to_string(), "25".to_string())));
        assert!(query.contains(&("user_id".to_string(), "1789".to_string())));
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(ListingParams::new().limit(0).limit, Some(1));
        assert_eq!(ListingParams::new().limit(500).limit, Some(MAX_PAGE_SIZE));
    }

    #[test]
    fn test_hashtag_edge_names() {
        assert_eq!(HashtagEdge::Recent.as_str(), "recent_media");
        assert_eq!(HashtagEdge::Top.as_str(), "top_media");
    }

    #[test]
    fn test_blank_fields_keep_default() {
        let params = ListingParams::new().fields(Some("   "));
        assert_eq!(params.fields_or_default(), DEFAULT_FIELDS);
    }
}
