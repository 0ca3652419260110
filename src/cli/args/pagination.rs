//! Listing and crawl argument types for CLI commands

use clap::Args;

use crate::config::CrawlSettings;
use crate::snapshot::CrawlOptions;

/// Shared arguments for live listing commands.
///
/// Flatten this into any command that fetches one Graph page:
/// ```ignore
/// Tags {
///     #[command(flatten)]
///     listing: ListingArgs,
/// }
/// ```
#[derive(Args, Debug, Clone)]
pub struct ListingArgs {
    /// Maximum items to return (clamped to 1..=50)
    #[arg(long, short = 'n', default_value_t = 12)]
    pub limit: usize,

    /// Comma-separated Graph field selection
    #[arg(long)]
    pub fields: Option<String>,
}

impl ListingArgs {
    pub fn fields_ref(&self) -> Option<&str> {
        self.fields.as_deref()
    }
}

/// Crawl bounds for `refresh`
#[derive(Args, Debug, Default, Clone)]
pub struct CrawlArgs {
    /// Items per Graph page (clamped to 1..=50, config default 3)
    #[arg(long)]
    pub per_page: Option<usize>,

    /// Stop after this many pages (config default 500)
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Comma-separated Graph field selection
    #[arg(long)]
    pub fields: Option<String>,
}

impl CrawlArgs {
    /// Merge the flags over the configured crawl defaults.
    pub fn to_options(&self, defaults: &CrawlSettings) -> CrawlOptions {
        CrawlOptions {
            page_size: self.per_page.unwrap_or(defaults.per_page),
            max_pages: self.max_pages.unwrap_or(defaults.max_pages).max(1),
            fields: self.fields.clone(),
        }
    }
}
