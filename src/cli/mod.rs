//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

pub mod admit;
pub mod args;
pub mod cache;
pub mod context;
pub mod local;
pub mod media;
pub mod refresh;
pub mod status;

pub use args::{CollectionArg, CrawlArgs, HashtagKind, ListingArgs, LocalQueryArgs, OutputFormat};
pub use context::CommandContext;

/// Gramgate - Instagram Graph API gateway with local snapshots
#[derive(Parser, Debug)]
#[command(name = "gramgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table)
    #[arg(
        long,
        global = true,
        env = "GRAMGATE_FORMAT",
        default_value = "json",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "GRAMGATE_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "GRAMGATE_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Bypass the listing cache, fetch fresh data from the Graph API
    #[arg(long, global = true, env = "GRAMGATE_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show configuration, credential and snapshot status
    Status,

    /// Display version information
    Version,

    /// Recent or top media for a hashtag
    Hashtag {
        /// Hashtag, with or without the leading #
        tag: String,

        /// Which hashtag listing to read
        #[arg(long = "type", value_enum, default_value = "recent")]
        kind: HashtagKind,

        #[command(flatten)]
        listing: ListingArgs,
    },

    /// Media published by the configured account
    SelfMedia {
        #[command(flatten)]
        listing: ListingArgs,
    },

    /// Media the configured account is tagged in
    Tags {
        #[command(flatten)]
        listing: ListingArgs,
    },

    /// Own and tagged media merged newest-first
    Merged {
        #[command(flatten)]
        listing: ListingArgs,
    },

    /// Children of a carousel album
    Children {
        /// Carousel media ID
        media_id: String,

        /// Comma-separated Graph field selection
        #[arg(long)]
        fields: Option<String>,
    },

    /// Crawl a collection into its local snapshot
    Refresh {
        /// Collection to crawl
        #[arg(value_enum)]
        collection: CollectionArg,

        #[command(flatten)]
        crawl: CrawlArgs,

        /// Run at most once per this many seconds, skipping otherwise
        #[arg(long, value_name = "SECS")]
        every: Option<u64>,
    },

    /// Query a local snapshot
    Local {
        /// Collection to query
        #[arg(value_enum)]
        collection: CollectionArg,

        #[command(flatten)]
        query: LocalQueryArgs,
    },

    /// Count one request against the rate limiter (exit 2 when limited)
    Admit {
        /// Rate-limit group, e.g. the endpoint name
        group: String,

        /// Direct connection address of the caller
        #[arg(long, default_value = "127.0.0.1")]
        remote_addr: String,

        /// Raw X-Forwarded-For header
        #[arg(long)]
        forwarded_for: Option<String>,

        /// Admin token presented by the caller
        #[arg(long, env = "GRAMGATE_ADMIN_TOKEN", hide_env = true)]
        admin_token: Option<String>,
    },

    /// Manage the listing cache
    #[command(subcommand)]
    Cache(CacheCommands),
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,
    /// Remove all cached listings
    Clear,
    /// Print the cache directory
    Path,
}
