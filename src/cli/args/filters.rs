//! Filter argument types for the local query command

use clap::Args;

use crate::context::RequestParams;

/// Filters and page window for `local`.
///
/// List flags accept repeated and comma-separated values:
/// - `--ids 1 --ids 2` (repeated)
/// - `--ids 1,2` (comma-separated)
///
/// Values are passed through as raw request parameters so the command
/// behaves exactly like the equivalent query string.
#[derive(Args, Debug, Default, Clone)]
pub struct LocalQueryArgs {
    /// Maximum items to return (1..=1000, unbounded when omitted)
    #[arg(long, short = 'n')]
    pub limit: Option<String>,

    /// Items to skip after filtering
    #[arg(long)]
    pub offset: Option<String>,

    /// Filter by media ID
    #[arg(long, visible_aliases = ["id", "mediaid"])]
    pub ids: Vec<String>,

    /// Filter by exact username
    #[arg(long, short = 'u')]
    pub username: Vec<String>,

    /// Earliest timestamp (RFC 3339, YYYY-MM-DD or unix seconds)
    #[arg(long)]
    pub since: Option<String>,

    /// Latest timestamp (RFC 3339, YYYY-MM-DD or unix seconds)
    #[arg(long)]
    pub until: Option<String>,

    /// Filter by permalink shortcode; `CODE!N` also selects carousel child N
    #[arg(long, short = 's')]
    pub shortcode: Vec<String>,

    /// Same as --shortcode, ignored when --shortcode is given
    #[arg(long)]
    pub permalink_id: Vec<String>,
}

impl LocalQueryArgs {
    /// Convert the flags to request parameters
    pub fn to_params(&self) -> RequestParams {
        let mut params = RequestParams::new();

        if let Some(ref limit) = self.limit {
            params.push("limit", limit.as_str());
        }
        if let Some(ref offset) = self.offset {
            params.push("offset", offset.as_str());
        }
        params.extend("ids", &self.ids);
        params.extend("username", &self.username);
        if let Some(ref since) = self.since {
            params.push("since", since.as_str());
        }
        if let Some(ref until) = self.until {
            params.push("until", until.as_str());
        }
        params.extend("shortcode", &self.shortcode);
        params.extend("permalink_id", &self.permalink_id);

        params
    }
}
