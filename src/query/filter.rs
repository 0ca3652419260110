//! Query predicates and page window

use std::collections::HashSet;

use serde::Serialize;

use super::selector::ShortcodeSelector;
use crate::context::RequestParams;
use crate::snapshot::{NormalizedItem, parse_instant};

/// Largest page a local query returns
pub const MAX_LIMIT: usize = 1000;

/// AND-combined item predicates. Empty sets and absent bounds match all.
#[derive(Debug, Clone, Default)]
pub struct MediaFilter {
    pub ids: HashSet<String>,
    pub usernames: HashSet<String>,
    /// Inclusive lower bound, unix seconds
    pub since: Option<i64>,
    /// Inclusive upper bound, unix seconds
    pub until: Option<i64>,
    pub shortcodes: Option<ShortcodeSelector>,
}

impl MediaFilter {
    /// Build from request parameters.
    ///
    /// `ids` (aliases `id`, `mediaid`), `username`, `since`, `until` and
    /// `shortcode` (alias `permalink_id`, used only when `shortcode` is
    /// absent). Unparsable time bounds are ignored.
    pub fn from_params(params: &RequestParams) -> Self {
        let mut shortcodes = params.list(&["shortcode"]);
        if shortcodes.is_empty() {
            shortcodes = params.list(&["permalink_id"]);
        }

        Self {
            ids: params.list(&["ids", "id", "mediaid"]).into_iter().collect(),
            usernames: params.list(&["username"]).into_iter().collect(),
            since: params.first(&["since"]).and_then(parse_instant),
            until: params.first(&["until"]).and_then(parse_instant),
            shortcodes: ShortcodeSelector::parse(shortcodes),
        }
    }

    pub fn matches(&self, item: &NormalizedItem) -> bool {
        if !self.ids.is_empty() && !item.id.as_ref().is_some_and(|id| self.ids.contains(id)) {
            return false;
        }

        if !self.usernames.is_empty()
            && !self
                .usernames
                .contains(item.username.as_deref().unwrap_or_default())
        {
            return false;
        }

        if self.since.is_some() || self.until.is_some() {
            // Unparsable timestamps filter as the epoch
            let ts = item.instant().unwrap_or(0);
            if self.since.is_some_and(|since| ts < since) {
                return false;
            }
            if self.until.is_some_and(|until| ts > until) {
                return false;
            }
        }

        match self.shortcodes {
            Some(ref selector) => selector.matches(item),
            None => true,
        }
    }
}

/// Offset and optional limit over the filtered set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub limit: Option<usize>,
    pub offset: usize,
}

impl PageWindow {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.map(|l| l.clamp(1, MAX_LIMIT as i64) as usize),
            offset: offset.map(|o| o.max(0) as usize).unwrap_or(0),
        }
    }

    /// Build from `limit` and `offset` parameters.
    ///
    /// A present but non-numeric value counts as 0 before clamping.
    pub fn from_params(params: &RequestParams) -> Self {
        let number = |name: &str| {
            params
                .first(&[name])
                .map(|raw| raw.parse::<i64>().unwrap_or(0))
        };
        Self::new(number("limit"), number("offset"))
    }

    /// The page of `items` this window selects
    pub fn slice<T>(&self, items: &[T]) -> std::ops::Range<usize> {
        let start = self.offset.min(items.len());
        let end = match self.limit {
            Some(limit) => start.saturating_add(limit).min(items.len()),
            None => items.len(),
        };
        start..end
    }
}
