//! Cache key construction and storage-name sanitization

use sha2::{Digest, Sha256};

/// Map a logical key to a safe file name stem.
///
/// Every character outside `[A-Za-z0-9_.-]` becomes `_`. Distinct keys may
/// collide after this transform, so variable-length or free-form components
/// must be hashed into the key with [`digest`] first.
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Hex SHA-256 of an arbitrary string
pub fn digest(value: &str) -> String {
    format!("{:x}", Sha256::digest(value.as_bytes()))
}

/// Build the cache key for a live listing.
///
/// `scope` names the listing and its bounded parameters (e.g.
/// `["tag", "sunset", "recent_media", "25"]`); the free-form field selection
/// is folded in as a digest so keys never collide after sanitization.
pub fn listing_key(scope: &[&str], fields: &str) -> String {
    let mut key = String::from("ig");
    for part in scope {
        key.push('_');
        key.push_str(part);
    }
    key.push('_');
    key.push_str(&digest(fields));
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_key_replaces_unsafe_characters() {
        assert_eq!(sanitize_key("ig_tag_sunset_recent"), "ig_tag_sunset_recent");
        assert_eq!(sanitize_key("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize_key("a b:c/é"), "a_b_c__");
    }

    #[test]
    fn test_listing_key_deterministic() {
        let key1 = listing_key(&["user_media", "1789", "25"], "id,caption");
        let key2 = listing_key(&["user_media", "1789", "25"], "id,caption");
        assert_eq!(key1, key2);
        assert!(key1.starts_with("ig_user_media_1789_25_"));
    }

    #[test]
    fn test_listing_key_differs_by_fields() {
        let key1 = listing_key(&["user_tags", "1789", "25"], "id");
        let key2 = listing_key(&["user_tags", "1789", "25"], "id,permalink");
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_listing_key_survives_sanitization() {
        let key = listing_key(&["tag", "sunset", "top_media", "10"], "children{media_url}");
        assert_eq!(sanitize_key(&key), key);
    }
}
