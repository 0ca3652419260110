//! Command execution context
//!
//! Provides a unified context for commands that talk to the Graph API,
//! covering config loading, credential validation and client setup.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStorage, CachedGraphClient};
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::GraphClient;
use crate::clock::{self, SharedClock};
use crate::config::Config;
use crate::error::Result;

/// Context for remote commands: config, client and runtime options.
pub struct CommandContext {
    /// Loaded configuration with environment overrides applied
    pub config: Config,
    /// Graph client behind the listing cache
    pub client: Arc<CachedGraphClient<GraphClient>>,
    /// Output format preference
    pub format: OutputFormat,
    pub clock: SharedClock,
}

impl CommandContext {
    /// Create a new command context with full initialization.
    ///
    /// # Errors
    /// Returns an error if the config cannot be parsed or credentials are
    /// missing.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = Config::load_at(opts.config_ref())?;
        let clock = clock::system();
        let raw_client = GraphClient::from_config(&config)?;

        // Cache disabled with --no-cache
        let cache = if opts.no_cache {
            None
        } else {
            Some(CacheStorage::open_at(config.cache_dir(), clock.clone()))
        };
        let client = CachedGraphClient::new(raw_client, cache)
            .with_ttl(Duration::from_secs(config.cache_ttl_seconds));

        Ok(Self {
            config,
            client: Arc::new(client),
            format: opts.format,
            clock,
        })
    }
}
