//! Explicit per-request context
//!
//! Everything a component needs to know about the caller (client identity,
//! admin standing, query parameters) is resolved once into a
//! [`RequestContext`] and passed in as plain data.

use std::net::IpAddr;

use sha2::{Digest, Sha256};

use crate::config::{AccessSettings, Config};

/// Resolved caller of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Client identity used for rate limiting
    pub client_ip: String,
    /// Admin token matched or direct address whitelisted
    pub admin: bool,
    pub params: RequestParams,
}

impl RequestContext {
    /// Build the context for one request.
    ///
    /// # Arguments
    /// * `remote_addr` - Direct connection address
    /// * `forwarded_for` - Raw `X-Forwarded-For` header, if any
    /// * `admin_token` - Token presented by the caller, if any
    pub fn resolve(
        config: &Config,
        remote_addr: &str,
        forwarded_for: Option<&str>,
        admin_token: Option<&str>,
        params: RequestParams,
    ) -> Self {
        let policy = AccessPolicy::new(&config.access);
        Self {
            client_ip: resolve_client_ip(remote_addr, forwarded_for, config.rate_limit.trust_proxy),
            admin: policy.is_admin(remote_addr, admin_token),
            params,
        }
    }
}

/// Pick the client identity.
///
/// The direct address is used unless `trust_proxy` is set and the first
/// forwarded-for entry is a well-formed IP address.
pub fn resolve_client_ip(remote_addr: &str, forwarded_for: Option<&str>, trust_proxy: bool) -> String {
    let remote = remote_addr.trim();
    if !trust_proxy {
        return remote.to_string();
    }

    forwarded_for
        .and_then(|header| header.split(',').next())
        .map(str::trim)
        .and_then(|first| first.parse::<IpAddr>().ok())
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| remote.to_string())
}

/// Admin access decisions
pub struct AccessPolicy {
    token_digest: Option<[u8; 32]>,
    whitelisted_ips: Vec<String>,
}

impl AccessPolicy {
    pub fn new(settings: &AccessSettings) -> Self {
        Self {
            token_digest: settings
                .admin_token
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(token_digest),
            whitelisted_ips: settings
                .whitelisted_ips
                .iter()
                .map(|ip| ip.trim().to_string())
                .filter(|ip| !ip.is_empty())
                .collect(),
        }
    }

    /// Whether the caller is an admin.
    ///
    /// Token comparison runs over fixed-size digests in constant time. The
    /// whitelist is checked against the direct address only.
    pub fn is_admin(&self, remote_addr: &str, presented_token: Option<&str>) -> bool {
        if let (Some(expected), Some(token)) = (self.token_digest, presented_token)
            && constant_time_eq(&expected, &token_digest(token.trim()))
        {
            return true;
        }
        let remote = remote_addr.trim();
        self.whitelisted_ips.iter().any(|ip| ip == remote)
    }
}

fn token_digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Multi-valued query parameters, in arrival order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    pairs: Vec<(String, String)>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one value for `name`
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Add several values for `name`
    pub fn extend<I, S>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.push(name, value);
        }
    }

    /// First non-blank value among `names`
    pub fn first(&self, names: &[&str]) -> Option<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| names.contains(&k.as_str()))
            .map(|(_, v)| v.trim())
            .find(|v| !v.is_empty())
    }

    /// All values among `names`, comma-split, trimmed, without empties or
    /// duplicates, in first-seen order.
    pub fn list(&self, names: &[&str]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for (_, raw) in self.pairs.iter().filter(|(k, _)| names.contains(&k.as_str())) {
            for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                if !out.iter().any(|seen| seen == part) {
                    out.push(part.to_string());
                }
            }
        }
        out
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ip_ignores_forwarded_without_trust() {
        assert_eq!(
            resolve_client_ip("10.0.0.1", Some("203.0.113.9"), false),
            "10.0.0.1"
        );
    }

    #[test]
    fn test_client_ip_uses_first_forwarded_when_trusted() {
        assert_eq!(
            resolve_client_ip("10.0.0.1", Some(" 203.0.113.9 , 10.0.0.2"), true),
            "203.0.113.9"
        );
        assert_eq!(
            resolve_client_ip("10.0.0.1", Some("2001:db8::1"), true),
            "2001:db8::1"
        );
    }

    #[test]
    fn test_malformed_forwarded_falls_back_to_remote() {
        assert_eq!(
            resolve_client_ip("10.0.0.1", Some("not-an-ip, 203.0.113.9"), true),
            "10.0.0.1"
        );
        assert_eq!(resolve_client_ip("10.0.0.1", Some(""), true), "10.0.0.1");
        assert_eq!(resolve_client_ip("10.0.0.1", None, true), "10.0.0.1");
    }

    #[test]
    fn test_admin_by_token() {
        let policy = AccessPolicy::new(&AccessSettings {
            admin_token: Some("s3cret".to_string()),
            whitelisted_ips: Vec::new(),
        });
        assert!(policy.is_admin("10.0.0.1", Some("s3cret")));
        assert!(!policy.is_admin("10.0.0.1", Some("s3cre")));
        assert!(!policy.is_admin("10.0.0.1", None));
    }

    #[test]
    fn test_blank_admin_token_never_matches() {
        let policy = AccessPolicy::new(&AccessSettings {
            admin_token: Some("  ".to_string()),
            whitelisted_ips: Vec::new(),
        });
        assert!(!policy.is_admin("10.0.0.1", Some("")));
    }

    #[test]
    fn test_admin_by_whitelist_uses_direct_address() {
        let mut config = Config::default();
        config.access.whitelisted_ips = vec!["127.0.0.1".to_string()];
        config.rate_limit.trust_proxy = true;

        let ctx = RequestContext::resolve(&config, "127.0.0.1", None, None, RequestParams::new());
        assert!(ctx.admin);

        // A forged forwarded address does not grant admin
        let ctx = RequestContext::resolve(
            &config,
            "10.0.0.5",
            Some("127.0.0.1"),
            None,
            RequestParams::new(),
        );
        assert!(!ctx.admin);
        assert_eq!(ctx.client_ip, "127.0.0.1");
    }

    #[test]
    fn test_params_list_splits_and_dedupes() {
        let mut params = RequestParams::new();
        params.push("id", "1, 2,,3");
        params.push("mediaid", "2");
        params.push("ids", " 4 ");
        params.push("other", "9");

        assert_eq!(params.list(&["ids", "id", "mediaid"]), vec!["1", "2", "3", "4"]);
        assert!(params.list(&["missing"]).is_empty());
    }

    #[test]
    fn test_params_first_skips_blank() {
        let mut params = RequestParams::new();
        params.push("limit", " ");
        params.push("limit", "25");
        assert_eq!(params.first(&["limit"]), Some("25"));
        assert_eq!(params.first(&["offset"]), None);
    }
}
