//! Snapshot refresh command

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use crate::cli::CommandContext;
use crate::cli::args::{CrawlArgs, GlobalOptions, OutputFormat};
use crate::client::GraphApi;
use crate::error::Result;
use crate::output;
use crate::scheduler::Scheduler;
use crate::snapshot::{Collection, CrawlOptions, Crawler, Snapshot, SnapshotStore};

/// Crawl a collection now, or at most once per `every` seconds.
pub async fn run(
    opts: &GlobalOptions,
    collection: Collection,
    crawl: &CrawlArgs,
    every: Option<u64>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let options = crawl.to_options(&ctx.config.crawl);

    match every {
        None => {
            let snapshot = crawl_collection(&ctx, collection, &options).await?;
            match ctx.format {
                OutputFormat::Json => output::print_json(&json!({
                    "collection": collection.name(),
                    "updated_at": snapshot.updated_at,
                    "count": snapshot.count,
                })),
                OutputFormat::Table => {
                    println!(
                        "Refreshed {}: {} items at {}",
                        collection,
                        snapshot.count,
                        snapshot.updated_at.as_deref().unwrap_or("unknown")
                    );
                    Ok(())
                }
            }
        }
        Some(window) => {
            let scheduler = Scheduler::new(ctx.config.scheduler_dir(), ctx.clock.clone());
            let task = collection.task_name();
            let ran = scheduler
                .try_run(&task, window, || async {
                    crawl_collection(&ctx, collection, &options).await.map(|_| ())
                })
                .await;

            let state = scheduler.state(&task).unwrap_or_default();
            match ctx.format {
                OutputFormat::Json => output::print_json(&json!({
                    "task": task,
                    "ran": ran,
                    "last_run": state.last_run,
                    "last_error": state.last_error,
                })),
                OutputFormat::Table => {
                    if ran {
                        println!("Ran {}", task);
                    } else {
                        println!(
                            "Skipped {}: ran within the last {}s or still running",
                            task, window
                        );
                    }
                    if let Some(ref err) = state.last_error {
                        println!("Last error: {}", err);
                    }
                    Ok(())
                }
            }
        }
    }
}

async fn crawl_collection(
    ctx: &CommandContext,
    collection: Collection,
    options: &CrawlOptions,
) -> Result<Snapshot> {
    let account_id = ctx.client.inner().account_id().to_string();
    let crawler = Crawler::new(
        ctx.client.inner().clone(),
        SnapshotStore::new(ctx.config.snapshot_dir()),
        ctx.clock.clone(),
    );

    let spinner = progress_spinner(collection);
    let result = crawler
        .crawl(
            collection.name(),
            &collection.endpoint(&account_id),
            options,
            |progress| {
                spinner.set_message(format!(
                    "{}: {} pages, {} items",
                    collection, progress.pages, progress.items
                ));
            },
        )
        .await;
    spinner.finish_and_clear();

    result
}

/// Spinner on stderr; indicatif hides it when stderr is not a terminal
fn progress_spinner(collection: Collection) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Crawling {}", collection));
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
