//! Live listing commands
//!
//! Each command fetches one Graph page through the listing cache and prints
//! the normalized items.

use crate::cli::CommandContext;
use crate::cli::args::{GlobalOptions, HashtagKind, ListingArgs};
use crate::error::Result;
use crate::output;

/// Recent or top media for a hashtag
pub async fn hashtag(
    opts: &GlobalOptions,
    tag: &str,
    kind: HashtagKind,
    listing: &ListingArgs,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let items = ctx
        .client
        .hashtag_media(tag, kind.into(), listing.limit, listing.fields_ref())
        .await?;
    output::print_items(&items, ctx.format)
}

/// Media published by the configured account
pub async fn self_media(opts: &GlobalOptions, listing: &ListingArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let items = ctx
        .client
        .user_media(listing.limit, listing.fields_ref())
        .await?;
    output::print_items(&items, ctx.format)
}

/// Media the configured account is tagged in
pub async fn tags(opts: &GlobalOptions, listing: &ListingArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let items = ctx
        .client
        .tagged_media(listing.limit, listing.fields_ref())
        .await?;
    output::print_items(&items, ctx.format)
}

/// Own and tagged media merged newest-first
pub async fn merged(opts: &GlobalOptions, listing: &ListingArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let items = ctx
        .client
        .merged_media(listing.limit, listing.fields_ref())
        .await?;
    output::print_items(&items, ctx.format)
}

/// Children of a carousel album
pub async fn children(opts: &GlobalOptions, media_id: &str, fields: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let items = ctx.client.children(media_id.trim(), fields).await?;
    output::print_items(&items, ctx.format)
}
