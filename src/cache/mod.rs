//! Local TTL cache for live Graph listings
//!
//! One JSON file per key under `<data_dir>/cache`. Cache failures never fail
//! a request: unreadable entries are misses and failed writes are logged.

pub mod client;
pub mod key;
pub mod storage;

use std::time::Duration;

/// Cache TTL configuration per data type
pub struct CacheTtl;

impl CacheTtl {
    // Live listings change slowly; the configured TTL usually overrides this
    pub const LISTINGS: Duration = Duration::from_secs(24 * 60 * 60); // 24 hr
}

// Re-export main types
pub use client::CachedGraphClient;
pub use storage::CacheStorage;
