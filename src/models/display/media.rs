//! Media item display model

use serde::Serialize;
use tabled::Tabled;

use super::common::{format_media_time, single_line, truncate_string};
use crate::snapshot::NormalizedItem;

const CAPTION_WIDTH: usize = 40;

/// Media item display model for table output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct MediaDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "TYPE")]
    pub media_type: String,

    #[tabled(rename = "USER")]
    pub username: String,

    /// Post time, UTC
    #[tabled(rename = "POSTED")]
    pub posted: String,

    /// First line of the caption, truncated
    #[tabled(rename = "CAPTION")]
    pub caption: String,

    #[tabled(rename = "PERMALINK")]
    pub permalink: String,
}

impl From<&NormalizedItem> for MediaDisplay {
    fn from(item: &NormalizedItem) -> Self {
        Self {
            id: item.id.clone().unwrap_or_default(),
            media_type: item
                .media_type
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_default(),
            username: item.username.clone().unwrap_or_default(),
            posted: item
                .timestamp
                .as_deref()
                .map(format_media_time)
                .unwrap_or_default(),
            caption: item
                .caption
                .as_deref()
                .map(|c| truncate_string(&single_line(c), CAPTION_WIDTH))
                .unwrap_or_default(),
            permalink: item.permalink.clone().unwrap_or_default(),
        }
    }
}
