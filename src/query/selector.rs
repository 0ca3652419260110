//! Shortcode filtering and carousel child selection
//!
//! A shortcode value is either `<code>` or `<code>!<N>`. Both filter by
//! `<code>`; the second form also picks the N-th (1-based) child of a
//! matching carousel album for display.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::snapshot::NormalizedItem;

static SHORTCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/(?:p|reel)/([^/]+)/?").unwrap());

/// Extract the lower-cased shortcode from a `/p/<code>/` or `/reel/<code>/`
/// permalink.
pub fn extract_shortcode(permalink: &str) -> Option<String> {
    SHORTCODE_RE
        .captures(permalink)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}

/// Parsed shortcode filter values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortcodeSelector {
    codes: Vec<String>,
    /// code -> 1-based child position
    selections: HashMap<String, usize>,
}

impl ShortcodeSelector {
    /// Parse raw values. Returns `None` when no usable code remains.
    pub fn parse<I, S>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selector = Self::default();

        for value in values {
            let raw = value.as_ref().trim().to_lowercase();
            if raw.is_empty() {
                continue;
            }

            let base = match raw.split_once('!') {
                Some((code, position)) => {
                    let code = code.trim();
                    let position = position.trim();
                    if !code.is_empty()
                        && !position.is_empty()
                        && position.bytes().all(|b| b.is_ascii_digit())
                    {
                        // Out-of-range positions never match a child
                        let n = position.parse::<usize>().unwrap_or(usize::MAX);
                        selector.selections.insert(code.to_string(), n);
                        code.to_string()
                    } else if !code.is_empty() {
                        code.to_string()
                    } else {
                        raw.clone()
                    }
                }
                None => raw.clone(),
            };

            if !selector.codes.contains(&base) {
                selector.codes.push(base);
            }
        }

        (!selector.codes.is_empty()).then_some(selector)
    }

    #[cfg(test)]
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn has_selections(&self) -> bool {
        !self.selections.is_empty()
    }

    /// Whether an item passes the shortcode filter.
    ///
    /// Items whose permalink has no recognizable shortcode fall back to a
    /// case-insensitive substring match, which can over-match short codes.
    pub fn matches(&self, item: &NormalizedItem) -> bool {
        let permalink = item.permalink.as_deref().unwrap_or_default();
        if permalink.is_empty() {
            return false;
        }

        match extract_shortcode(permalink) {
            Some(code) => self.codes.contains(&code),
            None => {
                let haystack = permalink.to_lowercase();
                self.codes.iter().any(|code| haystack.contains(code.as_str()))
            }
        }
    }

    /// Substitute the selected child's media into a matching carousel.
    ///
    /// No-op unless the item is a carousel whose shortcode carries a
    /// selection within `1..=children.len()`.
    pub fn apply_selection(&self, item: &mut NormalizedItem) {
        if !item.is_carousel() {
            return;
        }
        let Some(permalink) = item.permalink.clone().filter(|p| !p.is_empty()) else {
            return;
        };
        let Some(code) = extract_shortcode(&permalink) else {
            return;
        };
        let Some(&n) = self.selections.get(&code) else {
            return;
        };
        if n == 0 {
            return;
        }
        let Some(child) = item.children.get(n - 1).cloned() else {
            return;
        };

        if let Some(url) = child.media_url.filter(|u| !u.is_empty()) {
            item.media_url = Some(url);
        }
        if let Some(media_type) = child.media_type {
            item.media_type = Some(media_type);
        }
        item.permalink = Some(with_img_index(&permalink, n));
    }
}

/// Append `img_index=<n>` unless the permalink already carries one.
fn with_img_index(permalink: &str, n: usize) -> String {
    if !permalink.contains('?') {
        format!("{}?img_index={}", permalink, n)
    } else if !permalink.to_lowercase().contains("img_index=") {
        format!("{}&img_index={}", permalink, n)
    } else {
        permalink.to_string()
    }
}
