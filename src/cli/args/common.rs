//! Common CLI types shared across commands

use crate::client::HashtagEdge;
use crate::snapshot::Collection;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON format - structured for scripts and HTTP front ends (default)
    #[default]
    Json,
    /// Table format - one row per media item
    Table,
}

/// Snapshot collection selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CollectionArg {
    /// Media the account is tagged in
    Tagged,
    /// Media the account published
    SelfMedia,
}

impl From<CollectionArg> for Collection {
    fn from(arg: CollectionArg) -> Self {
        match arg {
            CollectionArg::Tagged => Collection::Tagged,
            CollectionArg::SelfMedia => Collection::SelfMedia,
        }
    }
}

/// Hashtag listing edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum HashtagKind {
    /// Most recent media (default)
    #[default]
    Recent,
    /// Most popular media
    Top,
}

impl From<HashtagKind> for HashtagEdge {
    fn from(kind: HashtagKind) -> Self {
        match kind {
            HashtagKind::Recent => HashtagEdge::Recent,
            HashtagKind::Top => HashtagEdge::Top,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_arg_maps_to_collection() {
        assert_eq!(Collection::from(CollectionArg::Tagged).name(), "tagged");
        assert_eq!(Collection::from(CollectionArg::SelfMedia).name(), "self-media");
    }

    #[test]
    fn test_hashtag_kind_maps_to_edge() {
        assert_eq!(HashtagEdge::from(HashtagKind::Recent).as_str(), "recent_media");
        assert_eq!(HashtagEdge::from(HashtagKind::Top).as_str(), "top_media");
    }
}
