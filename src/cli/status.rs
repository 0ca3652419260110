//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::clock;
use crate::config::Config;
use crate::error::Result;
use crate::output::formatters::format_unix_local;
use crate::scheduler::Scheduler;
use crate::snapshot::{Collection, SnapshotStore};

/// Run the status command to display configuration and snapshot status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "Gramgate Status".bold());

    let config_path = match opts.config_ref() {
        Some(path) => std::path::PathBuf::from(path),
        None => Config::default_path()?,
    };
    let config = Config::load_at(opts.config_ref())?;

    if config_path.exists() {
        println!("Config file: {}", config_path.display().to_string().cyan());
    } else {
        println!(
            "Config file: {} {}",
            config_path.display().to_string().cyan(),
            "(not found, using defaults)".dimmed()
        );
    }
    println!("Data dir:    {}", config.data_dir.display().to_string().cyan());
    println!();

    match config.validate_credentials() {
        Ok(credentials) => {
            println!("{} Account: {}", "✓".green(), credentials.account_id);
            match config.token_storage {
                Some(ref path) => println!(
                    "{} Access token resolved (storage: {})",
                    "✓".green(),
                    path.display()
                ),
                None => println!("{} Access token configured", "✓".green()),
            }
        }
        Err(_) => {
            println!("{} Graph credentials not configured", "✗".red());
            println!("  → Set IG_BUSINESS_ACCOUNT_ID and IG_ACCESS_TOKEN for live commands");
        }
    }
    println!(
        "{} Graph API: {}/{}",
        "○".dimmed(),
        config.api_host,
        config.graph_api_version
    );
    println!(
        "{} Rate limit: {} requests per {}s",
        "○".dimmed(),
        config.rate_limit.max_requests,
        config.rate_limit.window_seconds
    );
    println!();

    let store = SnapshotStore::new(config.snapshot_dir());
    let scheduler = Scheduler::new(config.scheduler_dir(), clock::system());
    for collection in Collection::ALL {
        let snapshot = store.load(collection.name());
        match snapshot.updated_at {
            Some(ref updated) => println!(
                "{} Snapshot {}: {} items, updated {}",
                "✓".green(),
                collection.to_string().bold(),
                snapshot.count,
                updated
            ),
            None => println!(
                "{} Snapshot {}: never refreshed",
                "○".dimmed(),
                collection.to_string().bold()
            ),
        }

        if let Some(state) = scheduler.state(&collection.task_name()) {
            let marker = if state.last_error.is_some() {
                "⚠".yellow()
            } else {
                "○".dimmed()
            };
            println!(
                "  {} Scheduled run: {}{}",
                marker,
                format_unix_local(state.last_run),
                if state.running { " (running)" } else { "" }
            );
            if let Some(ref err) = state.last_error {
                println!("    Last error: {}", err);
            }
        }
    }
    println!();

    Ok(())
}
