//! Configuration management for Gramgate
//!
//! Settings come from a YAML file (default `~/.gramgate/config.yaml`) with
//! credential overrides from the process environment. A missing file is not
//! an error: local queries and rate-limit checks run on defaults alone.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Default Graph API version when none is configured
pub const DEFAULT_GRAPH_API_VERSION: &str = "v24.0";

/// Default Graph API host
pub const DEFAULT_API_HOST: &str = "https://graph.facebook.com";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Instagram business/creator account ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_account_id: Option<String>,

    /// Long-lived access token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// File holding a refreshed access token; wins over `access_token`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_storage: Option<PathBuf>,

    /// Graph API version segment, e.g. `v24.0`
    #[serde(default = "default_graph_api_version")]
    pub graph_api_version: String,

    /// Graph API host
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// TTL for cached live listings
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,

    /// Root directory for cache, rate-limit, scheduler and snapshot files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    #[serde(default)]
    pub access: AccessSettings,

    #[serde(default)]
    pub crawl: CrawlSettings,
}

/// Inbound rate limiting settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Honour the first X-Forwarded-For address
    #[serde(default)]
    pub trust_proxy: bool,

    /// Behaviour when the limiter's own storage is unavailable
    #[serde(default)]
    pub on_storage_error: StorageFailureMode,
}

/// What a guarded component does when its storage substrate fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageFailureMode {
    /// Permit the guarded operation
    #[default]
    FailOpen,
    /// Deny the guarded operation
    FailClosed,
}

/// Admin access settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,

    #[serde(default)]
    pub whitelisted_ips: Vec<String>,
}

/// Defaults for snapshot crawls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSettings {
    #[serde(default = "default_per_page")]
    pub per_page: usize,

    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

fn default_graph_api_version() -> String {
    DEFAULT_GRAPH_API_VERSION.to_string()
}

fn default_api_host() -> String {
    DEFAULT_API_HOST.to_string()
}

fn default_cache_ttl() -> u64 {
    86_400
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("var")
}

fn default_window_seconds() -> u64 {
    60
}

fn default_max_requests() -> u32 {
    60
}

fn default_per_page() -> usize {
    3
}

fn default_max_pages() -> usize {
    500
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_seconds: default_window_seconds(),
            max_requests: default_max_requests(),
            trust_proxy: false,
            on_storage_error: StorageFailureMode::default(),
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            max_pages: default_max_pages(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            business_account_id: None,
            access_token: None,
            token_storage: None,
            graph_api_version: default_graph_api_version(),
            api_host: default_api_host(),
            cache_ttl_seconds: default_cache_ttl(),
            data_dir: default_data_dir(),
            rate_limit: RateLimitSettings::default(),
            access: AccessSettings::default(),
            crawl: CrawlSettings::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".gramgate").join("config.yaml"))
    }

    /// Load configuration from an explicit path or the default location,
    /// then apply environment overrides.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        let path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_path()?,
        };
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific path; defaults when absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Overlay environment variables onto the loaded file values.
    ///
    /// `lookup` abstracts the environment so the precedence is testable.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(id) = non_empty("IG_BUSINESS_ACCOUNT_ID") {
            self.business_account_id = Some(id);
        }
        if let Some(token) = non_empty("IG_ACCESS_TOKEN") {
            self.access_token = Some(token);
        }
        if let Some(storage) = non_empty("IG_TOKEN_STORAGE") {
            self.token_storage = Some(PathBuf::from(storage));
        }
        if let Some(version) = non_empty("GRAPH_API_VERSION") {
            self.graph_api_version = version;
        }
        if let Some(host) = non_empty("GRAMGATE_API_HOST") {
            self.api_host = host;
        }
        if let Some(dir) = non_empty("GRAMGATE_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
    }

    /// Resolve the access token, preferring the token storage file.
    pub fn resolve_access_token(&self) -> Option<String> {
        if let Some(ref storage) = self.token_storage {
            match std::fs::read_to_string(storage) {
                Ok(raw) if !raw.trim().is_empty() => return Some(raw.trim().to_string()),
                Ok(_) => {}
                Err(e) => log::debug!("Token storage {} unreadable: {}", storage.display(), e),
            }
        }
        self.access_token
            .as_ref()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Validate that remote credentials are present, returning them.
    pub fn validate_credentials(&self) -> Result<Credentials> {
        let account_id = self
            .business_account_id
            .as_ref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::MissingCredentials)?;
        let access_token = self
            .resolve_access_token()
            .ok_or(ConfigError::MissingCredentials)?;

        Ok(Credentials {
            account_id: account_id.trim().to_string(),
            access_token,
        })
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }

    pub fn rate_limit_dir(&self) -> PathBuf {
        self.data_dir.join("ratelimit")
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.data_dir.join("snapshots")
    }

    pub fn scheduler_dir(&self) -> PathBuf {
        self.data_dir.join("schedule")
    }
}

/// Validated remote credentials
#[derive(Debug, Clone)]
pub struct Credentials {
    pub account_id: String,
    pub access_token: String,
}
